use crate::{
    chars::{alpha_num, char, letter, one_of},
    BoxedParser,
};

const OP_CHARS: &str = ":!#$%&*+./<=>?@\\^|-~";

/// The lexical shape of a language, from which a [`TokenParser`](crate::token::TokenParser) is
/// generated.
///
/// Empty comment delimiters disable that kind of comment.
#[derive(Clone)]
pub struct LanguageDef<U: Clone> {
    pub comment_start: String,
    pub comment_end: String,
    pub comment_line: String,
    pub nested_comments: bool,
    pub ident_start: BoxedParser<char, U, char>,
    pub ident_letter: BoxedParser<char, U, char>,
    pub op_start: BoxedParser<char, U, char>,
    pub op_letter: BoxedParser<char, U, char>,
    pub reserved_names: Vec<String>,
    pub reserved_op_names: Vec<String>,
    pub case_sensitive: bool,
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// No comments, no reserved words, C-like identifiers and the usual operator characters.
pub fn empty_def<U: Clone + 'static>() -> LanguageDef<U> {
    LanguageDef {
        comment_start: String::new(),
        comment_end: String::new(),
        comment_line: String::new(),
        nested_comments: true,
        ident_start: letter().or(char('_')).boxed(),
        ident_letter: alpha_num().or(one_of("_'")).boxed(),
        op_start: one_of(OP_CHARS).boxed(),
        op_letter: one_of(OP_CHARS).boxed(),
        reserved_names: Vec::new(),
        reserved_op_names: Vec::new(),
        case_sensitive: true,
    }
}

pub fn haskell_style<U: Clone + 'static>() -> LanguageDef<U> {
    LanguageDef {
        comment_start: "{-".to_string(),
        comment_end: "-}".to_string(),
        comment_line: "--".to_string(),
        nested_comments: true,
        ident_start: letter().boxed(),
        ..empty_def()
    }
}

/// Java-style comments. Reserved words are matched ignoring case.
pub fn java_style<U: Clone + 'static>() -> LanguageDef<U> {
    LanguageDef {
        comment_start: "/*".to_string(),
        comment_end: "*/".to_string(),
        comment_line: "//".to_string(),
        nested_comments: true,
        ident_start: letter().boxed(),
        case_sensitive: false,
        ..empty_def()
    }
}

pub fn python_style<U: Clone + 'static>() -> LanguageDef<U> {
    LanguageDef {
        comment_line: "#".to_string(),
        nested_comments: false,
        ident_letter: alpha_num().or(char('_')).boxed(),
        reserved_names: names(&[
            "def", "class", "if", "else", "elif", "while", "for", "return", "import", "from",
            "try", "except", "raise", "pass", "with", "as", "lambda", "yield", "None", "True",
            "False", "await", "async",
        ]),
        reserved_op_names: names(&[
            "+", "-", "*", "/", "%", "**", "//", "==", "!=", "<", ">", "<=", ">=", "=", "+=", "-=",
            "*=", "/=",
        ]),
        ..empty_def()
    }
}

pub fn haskell98_def<U: Clone + 'static>() -> LanguageDef<U> {
    LanguageDef {
        reserved_op_names: names(&["::", "..", "=", "\\", "|", "<-", "->", "@", "~", "=>"]),
        reserved_names: names(&[
            "let", "in", "case", "of", "if", "then", "else", "data", "type", "class", "default",
            "deriving", "do", "import", "infix", "infixl", "infixr", "instance", "module",
            "newtype", "where", "primitive",
        ]),
        ..haskell_style()
    }
}

/// Haskell98 plus the FFI keywords, with `#` allowed in identifiers.
pub fn haskell_def<U: Clone + 'static>() -> LanguageDef<U> {
    let base = haskell98_def();
    let mut reserved_names = base.reserved_names.clone();
    reserved_names.extend(names(&["foreign", "import", "export", "primitive", "_ccall_", "_casm_", "forall"]));
    LanguageDef {
        ident_letter: base.ident_letter.clone().or(char('#')).boxed(),
        reserved_names,
        ..base
    }
}

pub fn mondrian_def<U: Clone + 'static>() -> LanguageDef<U> {
    LanguageDef {
        reserved_names: names(&[
            "case", "class", "default", "extends", "import", "in", "let", "new", "of", "package",
        ]),
        case_sensitive: true,
        ..java_style()
    }
}
