//! Filename-based content classification.
//!
//! Classification looks only at the name, never the bytes. Each file gets
//! exactly one [`Category`], picked in the fixed priority order
//! code → config → documentation → generic.

use serde::Serialize;

/// Files recognised as configuration regardless of extension (compared lower-cased).
const CONFIG_FILES: &[&str] = &[
    "package.json",
    "tsconfig.json",
    "cargo.toml",
    "requirements.txt",
    "go.mod",
    "pom.xml",
    ".env",
    "docker-compose.yml",
    "webpack.config.js",
];

const CODE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "ts", "tsx", "py", "go", "rs", "java", "cpp", "c", "php", "rb", "cs", "swift",
    "kt", "dart",
];

const DOC_EXTENSIONS: &[&str] = &["md", "txt", "rst"];

/// Summarization strategy chosen for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Code,
    Config,
    Documentation,
    Generic,
}

/// Result of [`classify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub extension: String,
    pub language: &'static str,
    pub is_code: bool,
    pub is_config: bool,
    pub is_documentation: bool,
}

impl Classification {
    /// First matching category; a `package.json` is config, not code, but a
    /// `webpack.config.js` is code because code wins.
    pub fn category(&self) -> Category {
        if self.is_code {
            Category::Code
        } else if self.is_config {
            Category::Config
        } else if self.is_documentation {
            Category::Documentation
        } else {
            Category::Generic
        }
    }
}

/// Classify a filename or path.
pub fn classify(filename: &str) -> Classification {
    let extension = extension_of(filename);
    let language = language_for_extension(&extension);
    Classification {
        is_code: CODE_EXTENSIONS.contains(&extension.as_str()),
        is_config: is_config_file(filename),
        is_documentation: DOC_EXTENSIONS.contains(&extension.as_str()),
        extension,
        language,
    }
}

/// Lower-cased text after the last `.`, or `""` when there is none.
pub fn extension_of(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

pub fn language_for_extension(extension: &str) -> &'static str {
    match extension {
        "js" => "JavaScript",
        "jsx" => "JavaScript (React)",
        "ts" => "TypeScript",
        "tsx" => "TypeScript (React)",
        "py" => "Python",
        "go" => "Go",
        "rs" => "Rust",
        "java" => "Java",
        "cpp" => "C++",
        "c" => "C",
        "php" => "PHP",
        "rb" => "Ruby",
        "cs" => "C#",
        "swift" => "Swift",
        "kt" => "Kotlin",
        "dart" => "Dart",
        "html" => "HTML",
        "css" => "CSS",
        "scss" => "SCSS",
        "json" => "JSON",
        "yaml" | "yml" => "YAML",
        "md" => "Markdown",
        "txt" => "Text",
        "sql" => "SQL",
        _ => "Unknown",
    }
}

/// Well-known manifest names (case-insensitive) and dotfiles.
pub fn is_config_file(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    CONFIG_FILES.contains(&lower.as_str()) || filename.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lowercased() {
        assert_eq!(extension_of("Main.RS"), "rs");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("Makefile"), "");
    }

    #[test]
    fn test_no_extension_is_unknown() {
        let c = classify("Makefile");
        assert_eq!(c.extension, "");
        assert_eq!(c.language, "Unknown");
        assert_eq!(c.category(), Category::Generic);
    }

    #[test]
    fn test_python_language() {
        let c = classify("app.py");
        assert_eq!(c.language, "Python");
        assert_eq!(c.category(), Category::Code);
    }

    #[test]
    fn test_config_names() {
        assert!(classify("package.json").is_config);
        assert!(classify(".env").is_config);
        assert!(classify("Cargo.toml").is_config);
        assert!(classify(".gitignore").is_config);
        assert!(!classify("settings.json").is_config);
        assert_eq!(classify("package.json").category(), Category::Config);
    }

    #[test]
    fn test_code_wins_over_config() {
        let c = classify("webpack.config.js");
        assert!(c.is_code && c.is_config);
        assert_eq!(c.category(), Category::Code);
    }

    #[test]
    fn test_config_wins_over_documentation() {
        let c = classify("requirements.txt");
        assert!(c.is_config && c.is_documentation);
        assert_eq!(c.category(), Category::Config);
    }

    #[test]
    fn test_documentation() {
        assert_eq!(classify("README.md").category(), Category::Documentation);
        assert_eq!(classify("notes.rst").category(), Category::Documentation);
        assert_eq!(classify("notes.rst").language, "Unknown");
    }

    #[test]
    fn test_category_priority() {
        for name in [
            "a.ts",
            "b.json",
            ".env",
            "c.md",
            "d.bin",
            "",
            ".",
            "x.",
            "README",
            "e.yml",
            "webpack.config.js",
            "requirements.txt",
        ] {
            let c = classify(name);
            let expected = if c.is_code {
                Category::Code
            } else if c.is_config {
                Category::Config
            } else if c.is_documentation {
                Category::Documentation
            } else {
                Category::Generic
            };
            assert_eq!(c.category(), expected, "{}", name);
        }

        assert_eq!(classify("webpack.config.js").category(), Category::Code);
        assert_eq!(classify("requirements.txt").category(), Category::Config);
        assert_eq!(classify("d.bin").category(), Category::Generic);
    }
}
