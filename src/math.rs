//! Unicode approximation of LaTeX math for terminal display.

/// Groups nested deeper than this are emitted as written.
const MAX_DEPTH: usize = 64;

/// Converts a LaTeX math fragment into readable Unicode text.
///
/// Covers Greek letters, common operators and relations, `\frac`, `\sqrt`,
/// text commands, and super/subscripts. Unknown commands are kept as written.
pub fn latex_to_unicode(src: &str) -> String {
    let mut parser = MathParser {
        chars: src.chars().collect(),
        pos: 0,
        depth: 0,
    };
    let out = parser.parse_until(None);
    collapse_spaces(&out)
}

struct MathParser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl MathParser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn rest_verbatim(&mut self) -> String {
        let rest = self.chars[self.pos..].iter().collect();
        self.pos = self.chars.len();
        rest
    }

    fn parse_until(&mut self, close: Option<char>) -> String {
        if self.depth >= MAX_DEPTH {
            return match close {
                Some('}') => format!("{{{}", self.rest_verbatim()),
                _ => self.rest_verbatim(),
            };
        }
        self.depth += 1;
        let mut out = String::new();
        while let Some(c) = self.next() {
            if Some(c) == close {
                break;
            }
            match c {
                '\\' => out.push_str(&self.command()),
                '{' => out.push_str(&self.parse_until(Some('}'))),
                '^' => {
                    let arg = self.argument();
                    out.push_str(&script(&arg, superscript, '^'));
                }
                '_' => {
                    let arg = self.argument();
                    out.push_str(&script(&arg, subscript, '_'));
                }
                '~' => out.push(' '),
                other => out.push(other),
            }
        }
        self.depth -= 1;
        out
    }

    /// Reads one argument: a braced group, a command, or a single character.
    fn argument(&mut self) -> String {
        if self.depth >= MAX_DEPTH {
            return self.rest_verbatim();
        }
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.depth += 1;
        let arg = match self.next() {
            Some('{') => self.parse_until(Some('}')),
            Some('\\') => self.command(),
            Some(c) => c.to_string(),
            None => String::new(),
        };
        self.depth -= 1;
        arg
    }

    fn command(&mut self) -> String {
        let Some(first) = self.next() else {
            return "\\".to_string();
        };
        if !first.is_ascii_alphabetic() {
            return match first {
                ',' | ';' | ':' | ' ' => " ".to_string(),
                '!' => String::new(),
                '\\' => " ".to_string(),
                other => other.to_string(),
            };
        }

        let mut name = String::from(first);
        while let Some(c) = self.peek().filter(char::is_ascii_alphabetic) {
            name.push(c);
            self.pos += 1;
        }

        match name.as_str() {
            "frac" | "dfrac" | "tfrac" => {
                let num = self.argument();
                let den = self.argument();
                format!("{}/{}", group(&num), group(&den))
            }
            "sqrt" => {
                let arg = self.argument();
                format!("√{}", group(&arg))
            }
            "text" | "mathrm" | "mathbf" | "mathit" | "mathsf" | "operatorname" | "textbf" => {
                self.argument()
            }
            "left" | "right" | "big" | "Big" | "bigg" | "Bigg" | "displaystyle" => String::new(),
            "quad" | "qquad" => " ".to_string(),
            _ => symbol(&name)
                .map(str::to_string)
                .unwrap_or_else(|| format!("\\{}", name)),
        }
    }
}

fn group(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= 1 || trimmed.chars().all(|c| c.is_alphanumeric()) {
        trimmed.to_string()
    } else {
        format!("({})", trimmed)
    }
}

fn script(arg: &str, map: fn(char) -> Option<char>, marker: char) -> String {
    let arg = arg.trim();
    let mapped: Option<String> = arg.chars().map(map).collect();
    match mapped {
        Some(s) if !s.is_empty() => s,
        _ => format!("{}{}", marker, group(arg)),
    }
}

fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = false;
    for c in text.chars() {
        let is_space = c.is_whitespace();
        if !(is_space && last_space) {
            out.push(if is_space { ' ' } else { c });
        }
        last_space = is_space;
    }
    out.trim().to_string()
}

fn superscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' | '−' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        'T' => 'ᵀ',
        _ => return None,
    })
}

fn subscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' | '−' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'k' => 'ₖ',
        'n' => 'ₙ',
        'x' => 'ₓ',
        _ => return None,
    })
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" | "varepsilon" => "ε",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" | "vartheta" => "θ",
        "iota" => "ι",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "phi" | "varphi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Xi" => "Ξ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Phi" => "Φ",
        "Psi" => "Ψ",
        "Omega" => "Ω",
        "times" => "×",
        "cdot" => "·",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "leq" | "le" => "≤",
        "geq" | "ge" => "≥",
        "neq" | "ne" => "≠",
        "approx" => "≈",
        "equiv" => "≡",
        "sim" => "∼",
        "propto" => "∝",
        "infty" => "∞",
        "sum" => "∑",
        "prod" => "∏",
        "int" => "∫",
        "oint" => "∮",
        "partial" => "∂",
        "nabla" => "∇",
        "to" | "rightarrow" => "→",
        "leftarrow" => "←",
        "Rightarrow" | "implies" => "⇒",
        "Leftarrow" => "⇐",
        "iff" | "Leftrightarrow" => "⇔",
        "mapsto" => "↦",
        "in" => "∈",
        "notin" => "∉",
        "subset" => "⊂",
        "subseteq" => "⊆",
        "supset" => "⊃",
        "cup" => "∪",
        "cap" => "∩",
        "emptyset" | "varnothing" => "∅",
        "forall" => "∀",
        "exists" => "∃",
        "neg" | "lnot" => "¬",
        "land" | "wedge" => "∧",
        "lor" | "vee" => "∨",
        "ldots" | "dots" => "…",
        "cdots" => "⋯",
        "circ" => "∘",
        "degree" => "°",
        "langle" => "⟨",
        "rangle" => "⟩",
        "lfloor" => "⌊",
        "rfloor" => "⌋",
        "lceil" => "⌈",
        "rceil" => "⌉",
        "mathbb" => "",
        "sin" => "sin",
        "cos" => "cos",
        "tan" => "tan",
        "log" => "log",
        "ln" => "ln",
        "exp" => "exp",
        "lim" => "lim",
        "max" => "max",
        "min" => "min",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greek_and_operators() {
        assert_eq!(latex_to_unicode(r"\alpha + \beta \leq \pi"), "α + β ≤ π");
        assert_eq!(latex_to_unicode(r"a \times b \neq c"), "a × b ≠ c");
    }

    #[test]
    fn test_superscripts_and_subscripts() {
        assert_eq!(latex_to_unicode("E = mc^2"), "E = mc²");
        assert_eq!(latex_to_unicode("x_{10}^{n+1}"), "x₁₀ⁿ⁺¹");
        assert_eq!(latex_to_unicode("e^{i\\theta}"), "e^iθ");
        assert_eq!(latex_to_unicode("2^{x+y}"), "2^(x+y)");
    }

    #[test]
    fn test_fractions_and_roots() {
        assert_eq!(latex_to_unicode(r"\frac{1}{2}"), "1/2");
        assert_eq!(latex_to_unicode(r"\frac{a+b}{c}"), "(a+b)/c");
        assert_eq!(latex_to_unicode(r"\sqrt{x^2 + y^2}"), "√(x² + y²)");
    }

    #[test]
    fn test_text_and_spacing() {
        assert_eq!(
            latex_to_unicode(r"\text{if }x\,\in\,\mathbb{R}"),
            "if x ∈ R"
        );
        assert_eq!(latex_to_unicode(r"\left( a \right)"), "( a )");
    }

    #[test]
    fn test_deep_nesting_is_emitted_verbatim() {
        let depth = 200_000;
        let src = format!("{}x{}", "{".repeat(depth), "}".repeat(depth));
        let out = latex_to_unicode(&src);
        assert!(out.contains('x'));
        assert!(out.starts_with('{'));

        assert_eq!(latex_to_unicode("{{{a}}}"), "a");
    }

    #[test]
    fn test_deep_command_chain_is_emitted_verbatim() {
        let src = format!("{}x", r"\sqrt".repeat(50_000));
        let out = latex_to_unicode(&src);
        assert!(out.starts_with('√'));
        assert!(out.ends_with('x') || out.contains("x)"));
    }

    #[test]
    fn test_unknown_command_is_kept() {
        assert_eq!(latex_to_unicode(r"\foo x"), "\\foo x");
    }
}
