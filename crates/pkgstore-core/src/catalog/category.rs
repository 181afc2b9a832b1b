//! Name-based category guesses for the full catalog.

/// Category for names that match no heuristic.
pub const OTHER_CATEGORY: &str = "Other";

/// Ordered rules; the first rule with a matching fragment wins.
const CATEGORY_RULES: &[(&[&str], &str)] = &[
    (&["python", "node", "java", "jdk"], "Dev"),
    (&["xfce", "x11", "gtk", "thunar"], "Desktop"),
    (&["vim", "nano", "emacs"], "Editors"),
    (&["ssh", "curl", "wget"], "Network"),
    (&["audio", "pulseaudio"], "Media"),
];

/// Guess a display category from substrings of the package name.
pub fn infer_category(name: &str) -> &'static str {
    CATEGORY_RULES
        .iter()
        .find(|(fragments, _)| fragments.iter().any(|f| name.contains(f)))
        .map_or(OTHER_CATEGORY, |(_, category)| category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_fragments() {
        assert_eq!(infer_category("python-numpy"), "Dev");
        assert_eq!(infer_category("openjdk-17"), "Dev");
        assert_eq!(infer_category("xfce4-panel"), "Desktop");
        assert_eq!(infer_category("neovim"), "Editors");
        assert_eq!(infer_category("libcurl"), "Network");
        assert_eq!(infer_category("pulseaudio"), "Media");
    }

    #[test]
    fn earlier_rules_take_precedence() {
        // "nodejs-vim" hits both Dev and Editors.
        assert_eq!(infer_category("nodejs-vim"), "Dev");
    }

    #[test]
    fn falls_back_to_other() {
        assert_eq!(infer_category("htop"), OTHER_CATEGORY);
    }
}
