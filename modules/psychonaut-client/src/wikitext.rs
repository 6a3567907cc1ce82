//! Wikitext sanitizing shared by the property parser.

use std::sync::LazyLock;

use regex::Regex;

static NAMED_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[.*?\|(.*?)\]\]").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[(.*?)\]\]").unwrap());
static SUB_SUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<su[bp]>(.*?)</su[bp]>").unwrap());

/// Strips `[[target|label]]`, `[[link]]`, and `<sub>/<sup>` markup, keeping
/// the visible text. Strings without any of those tokens come back as-is.
pub fn strip_markup(text: &str) -> String {
    let text = NAMED_LINK.replace_all(text, "$1");
    let text = LINK.replace_all(&text, "$1");
    SUB_SUP.replace_all(&text, "$1").into_owned()
}

/// Inner texts of every `[[...]]` occurrence, in order.
pub fn link_targets(text: &str) -> Vec<String> {
    LINK.captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labelled_links_keep_the_label() {
        assert_eq!(strip_markup("[[Serotonin|5-HT]] agonist"), "5-HT agonist");
    }

    #[test]
    fn bare_links_keep_the_target() {
        assert_eq!(strip_markup("see [[Alcohol]]"), "see Alcohol");
    }

    #[test]
    fn sub_and_sup_wrappers_are_unwrapped() {
        assert_eq!(strip_markup("LD<sub>50</sub>"), "LD50");
        assert_eq!(strip_markup("5-HT<SUP>2A</SUP>"), "5-HT2A");
    }

    #[test]
    fn plain_text_is_a_fixed_point() {
        let plain = "Dizziness and nausea (at high doses)";
        assert_eq!(strip_markup(plain), plain);
    }

    #[test]
    fn link_targets_collects_every_occurrence() {
        assert_eq!(
            link_targets("[[Amphetamine]], [[Cocaine]] and more"),
            vec!["Amphetamine".to_string(), "Cocaine".to_string()]
        );
        assert!(link_targets("no links here").is_empty());
    }

    #[test]
    fn link_targets_has_no_carry_over_between_calls() {
        assert_eq!(link_targets("[[MDMA]]"), vec!["MDMA".to_string()]);
        assert_eq!(link_targets("[[MDMA]]"), vec!["MDMA".to_string()]);
    }
}
