/* Identifier case conversion for generated code */

/// `FrameHeader` -> `frame_header`, `HTTPHeader` -> `http_header`.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (idx, c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev_lower = idx > 0 && (chars[idx - 1].is_ascii_lowercase() || chars[idx - 1].is_ascii_digit());
            let next_lower = chars.get(idx + 1).is_some_and(|n| n.is_ascii_lowercase());
            let prev_upper = idx > 0 && chars[idx - 1].is_ascii_uppercase();
            if prev_lower || (prev_upper && next_lower) {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if *c == '.' || *c == '-' || *c == ' ' {
            out.push('_');
        } else {
            out.push(*c);
        }
    }
    out
}

pub fn upper_snake_case(name: &str) -> String {
    snake_case(name).to_ascii_uppercase()
}

/* Rust (strict + reserved) and C keywords; none of them may name a
   generated variable. */
const RESERVED_WORDS: &[&str] = &[
    "Self", "abstract", "as", "async", "auto", "await", "become", "bool", "box", "break",
    "case", "char", "const", "continue", "crate", "default", "do", "double", "dyn", "else",
    "enum", "extern", "false", "final", "float", "fn", "for", "gen", "goto", "if", "impl",
    "in", "inline", "int", "let", "long", "loop", "macro", "match", "mod", "move", "mut",
    "override", "priv", "pub", "ref", "register", "restrict", "return", "self", "short",
    "signed", "sizeof", "static", "struct", "super", "switch", "trait", "true", "try",
    "type", "typedef", "typeof", "union", "unsafe", "unsigned", "unsized", "use", "virtual",
    "void", "volatile", "where", "while", "yield",
];

/// ASCII identifier valid in both Rust and C.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name) || name == "_" || name.starts_with("__")
}
