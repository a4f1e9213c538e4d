//! Built-in theme palettes
//!
//! Themes are static data consumed by the frontend; the store only
//! records the active theme name under `appearance.theme`.

use serde_json::{json, Value};

/// Theme used when an unknown name is requested.
pub const FALLBACK_THEME: &str = "military";

/// All built-in themes, keyed by identifier.
pub fn themes() -> Value {
    json!({
        "military": {
            "name": "Military",
            "colors": {
                "black": "#0a0a0a", "dark": "#111111", "card": "#151515",
                "border": "#252525", "text": "#e5e5e5", "muted": "#6b6b6b",
                "accent": "#f97316", "success": "#22c55e", "error": "#ef4444",
            }
        },
        "cyberpunk": {
            "name": "Cyberpunk",
            "colors": {
                "black": "#0d0d1a", "dark": "#1a1a2e", "card": "#16213e",
                "border": "#0f3460", "text": "#eaeaea", "muted": "#7f8c8d",
                "accent": "#e94560", "success": "#00ff88", "error": "#ff6b6b",
            }
        },
        "matrix": {
            "name": "Matrix",
            "colors": {
                "black": "#000000", "dark": "#0a0a0a", "card": "#0d1117",
                "border": "#003300", "text": "#00ff00", "muted": "#008800",
                "accent": "#00ff00", "success": "#00ff00", "error": "#ff0000",
            }
        },
        "nord": {
            "name": "Nord",
            "colors": {
                "black": "#2e3440", "dark": "#3b4252", "card": "#434c5e",
                "border": "#4c566a", "text": "#eceff4", "muted": "#d8dee9",
                "accent": "#88c0d0", "success": "#a3be8c", "error": "#bf616a",
            }
        },
        "dracula": {
            "name": "Dracula",
            "colors": {
                "black": "#21222c", "dark": "#282a36", "card": "#44475a",
                "border": "#6272a4", "text": "#f8f8f2", "muted": "#6272a4",
                "accent": "#bd93f9", "success": "#50fa7b", "error": "#ff5555",
            }
        },
    })
}

/// Whether `name` is a known theme identifier.
pub fn is_known_theme(name: &str) -> bool {
    themes().get(name).is_some()
}

/// Colors for `theme_name`, falling back to [`FALLBACK_THEME`].
pub fn theme_colors(theme_name: &str) -> Value {
    let all = themes();
    let theme = all
        .get(theme_name)
        .or_else(|| all.get(FALLBACK_THEME))
        .cloned()
        .unwrap_or(Value::Null);
    theme.get("colors").cloned().unwrap_or_else(|| json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_five_themes_present() {
        let all = themes();
        for name in ["military", "cyberpunk", "matrix", "nord", "dracula"] {
            assert!(all.get(name).is_some(), "missing theme {name}");
        }
    }

    #[test]
    fn test_unknown_theme_falls_back_to_military() {
        assert_eq!(theme_colors("ghost"), theme_colors("military"));
    }

    #[test]
    fn test_colors_carry_accent() {
        assert_eq!(theme_colors("nord")["accent"], "#88c0d0");
    }
}
