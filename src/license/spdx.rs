//! The catalog embedded in the binary.
//!
//! Each entry is an SPDX identifier with its template from `licenses/`. Order
//! matters: it is the tie-break order for fuzzy scoring and the evaluation
//! order for patterns.

use crate::error::Result;
use crate::license::catalog::LicenseCatalog;
use crate::license::template::PatternSource;

/// Full license texts. The `-or-later` GNU entries hold the notice that
/// source files carry instead.
const TEMPLATES: &[(&str, &str)] = &[
    ("MIT", include_str!("../../licenses/MIT.txt")),
    ("MIT-0", include_str!("../../licenses/MIT-0.txt")),
    ("X11", include_str!("../../licenses/X11.txt")),
    ("ISC", include_str!("../../licenses/ISC.txt")),
    ("0BSD", include_str!("../../licenses/0BSD.txt")),
    ("BSD-1-Clause", include_str!("../../licenses/BSD-1-Clause.txt")),
    ("BSD-2-Clause", include_str!("../../licenses/BSD-2-Clause.txt")),
    ("BSD-3-Clause", include_str!("../../licenses/BSD-3-Clause.txt")),
    ("BSD-4-Clause", include_str!("../../licenses/BSD-4-Clause.txt")),
    ("Apache-1.1", include_str!("../../licenses/Apache-1.1.txt")),
    ("Apache-2.0", include_str!("../../licenses/Apache-2.0.txt")),
    ("Unlicense", include_str!("../../licenses/Unlicense.txt")),
    ("WTFPL", include_str!("../../licenses/WTFPL.txt")),
    ("CC0-1.0", include_str!("../../licenses/CC0-1.0.txt")),
    ("Zlib", include_str!("../../licenses/Zlib.txt")),
    ("BSL-1.0", include_str!("../../licenses/BSL-1.0.txt")),
    ("Artistic-1.0-Perl", include_str!("../../licenses/Artistic-1.0-Perl.txt")),
    ("MS-PL", include_str!("../../licenses/MS-PL.txt")),
    ("EPL-2.0", include_str!("../../licenses/EPL-2.0.txt")),
    ("MPL-1.1", include_str!("../../licenses/MPL-1.1.txt")),
    ("MPL-2.0", include_str!("../../licenses/MPL-2.0.txt")),
    ("GPL-1.0-only", include_str!("../../licenses/GPL-1.0-only.txt")),
    ("GPL-2.0-only", include_str!("../../licenses/GPL-2.0-only.txt")),
    ("GPL-2.0-or-later", include_str!("../../licenses/GPL-2.0-or-later.txt")),
    ("GPL-3.0-only", include_str!("../../licenses/GPL-3.0-only.txt")),
    ("GPL-3.0-or-later", include_str!("../../licenses/GPL-3.0-or-later.txt")),
    ("LGPL-2.0-only", include_str!("../../licenses/LGPL-2.0-only.txt")),
    ("LGPL-2.1-only", include_str!("../../licenses/LGPL-2.1-only.txt")),
    ("LGPL-2.1-or-later", include_str!("../../licenses/LGPL-2.1-or-later.txt")),
    ("LGPL-3.0-only", include_str!("../../licenses/LGPL-3.0-only.txt")),
    ("LGPL-3.0-or-later", include_str!("../../licenses/LGPL-3.0-or-later.txt")),
    ("AGPL-3.0-only", include_str!("../../licenses/AGPL-3.0-only.txt")),
    ("AGPL-3.0-or-later", include_str!("../../licenses/AGPL-3.0-or-later.txt")),
    ("GFDL-1.2-only", include_str!("../../licenses/GFDL-1.2-only.txt")),
    ("GFDL-1.3-only", include_str!("../../licenses/GFDL-1.3-only.txt")),
];

/// Extra structural patterns for entries above (short-form notices).
const NOTICES: &[(&str, &str)] = &[
    ("Apache-2.0", include_str!("../../licenses/Apache-2.0-NOTICE.txt")),
    ("MPL-2.0", include_str!("../../licenses/MPL-2.0-NOTICE.txt")),
    ("GPL-2.0-only", include_str!("../../licenses/GPL-2.0-only-NOTICE.txt")),
    ("GPL-3.0-only", include_str!("../../licenses/GPL-3.0-only-NOTICE.txt")),
    ("LGPL-2.1-only", include_str!("../../licenses/LGPL-2.1-only-NOTICE.txt")),
    ("LGPL-3.0-only", include_str!("../../licenses/LGPL-3.0-only-NOTICE.txt")),
    ("AGPL-3.0-only", include_str!("../../licenses/AGPL-3.0-only-NOTICE.txt")),
];

/// Build the embedded catalog.
///
/// Compiles every template; call once at startup and share the result.
pub fn bundled_catalog() -> Result<LicenseCatalog> {
    let mut builder = LicenseCatalog::builder();
    for (identifier, markup) in TEMPLATES {
        builder.template(identifier, markup)?;
    }
    for (identifier, markup) in NOTICES {
        builder.pattern(identifier, &PatternSource::Template(markup.to_string()))?;
    }
    Ok(builder.build())
}

/// Identifiers of the embedded catalog, in catalog order.
pub fn bundled_identifiers() -> impl Iterator<Item = &'static str> {
    TEMPLATES.iter().map(|(id, _)| *id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::OnceLock;

    use super::*;
    use crate::license::classifier::{Classifier, Matcher};
    use crate::license::exact::ExactMatcher;
    use crate::license::fuzzy::{FuzzyMatcher, Scoring, DEFAULT_THRESHOLD};
    use crate::license::pattern::PatternMatcher;

    const FULL_TEXTS: [&str; 18] = [
        "GPL-1.0-only",
        "GPL-2.0-only",
        "GPL-3.0-only",
        "LGPL-2.0-only",
        "LGPL-2.1-only",
        "LGPL-3.0-only",
        "AGPL-3.0-only",
        "MPL-1.1",
        "MPL-2.0",
        "Apache-1.1",
        "BSD-1-Clause",
        "EPL-2.0",
        "MS-PL",
        "CC0-1.0",
        "WTFPL",
        "Artistic-1.0-Perl",
        "GFDL-1.2-only",
        "GFDL-1.3-only",
    ];

    fn catalog() -> &'static LicenseCatalog {
        static CATALOG: OnceLock<LicenseCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| bundled_catalog().unwrap())
    }

    fn canonical(id: &str) -> &'static str {
        catalog().get(id).and_then(|e| e.canonical_text()).unwrap()
    }

    /// Same tokens, hostile whitespace.
    fn reformat(text: &str) -> String {
        let body = text.split_whitespace().collect::<Vec<_>>().join(" \t\n   ");
        format!("\n\n\t{body}\r\n\n")
    }

    fn gpl2_notice_with_holder() -> String {
        let notice = canonical("GPL-2.0-or-later");
        let grant = notice.find("This program is free software").unwrap();
        format!(
            "widget - frobnicates things\nCopyright (C) 2001-2020 Jane Doe <jane@example.com>\n\n{}",
            &notice[grant..]
        )
    }

    fn mit_with_holder() -> String {
        canonical("MIT").replace(
            "Copyright (c) <year> <copyright holders>",
            "Copyright (c) 2016-2024 Jane Doe <jane@example.com>",
        )
    }

    #[test]
    fn test_bundled_catalog_builds() {
        let catalog = catalog();
        assert_eq!(catalog.len(), TEMPLATES.len());
        let ids: Vec<&str> = catalog.identifiers().collect();
        let expected: Vec<&str> = bundled_identifiers().collect();
        assert_eq!(ids, expected);
        assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
        for id in ["Apache-2.0", "MPL-2.0", "GPL-2.0-only", "GPL-3.0-only", "AGPL-3.0-only"] {
            assert_eq!(catalog.get(id).unwrap().patterns().len(), 2, "{id}");
        }
        assert_eq!(catalog.get("GPL-2.0-or-later").unwrap().patterns().len(), 1);
    }

    #[test]
    fn test_full_texts_identify_themselves() {
        let exact = ExactMatcher::new(catalog().exact_references());
        let fuzzy = FuzzyMatcher::new(
            catalog().fuzzy_templates(),
            Scoring::TokenDifference,
            DEFAULT_THRESHOLD,
        )
        .unwrap();
        let patterns = PatternMatcher::from_catalog(catalog());
        let chain = Classifier::standard(catalog()).unwrap();
        for id in FULL_TEXTS {
            let text = canonical(id);
            assert_eq!(exact.identify_text(text), Some(id), "exact: {id}");
            assert_eq!(fuzzy.identify_text(text), Some(id), "fuzzy: {id}");
            assert_eq!(patterns.identify_text(text), Some(id), "pattern: {id}");
            let found = chain.classify(&reformat(text)).unwrap();
            assert_eq!((found.identifier, found.strategy), (id, "exact"), "chain: {id}");
        }
    }

    #[test]
    fn test_full_gnu_texts_without_appendix() {
        let patterns = PatternMatcher::from_catalog(catalog());
        for id in ["GPL-1.0-only", "GPL-2.0-only", "GPL-3.0-only", "LGPL-2.1-only", "AGPL-3.0-only"] {
            let full = canonical(id);
            let end = full.find("END OF TERMS AND CONDITIONS").unwrap();
            let trimmed = &full[..end + "END OF TERMS AND CONDITIONS".len()];
            assert_eq!(patterns.identify_text(trimmed), Some(id), "{id}");
        }
    }

    #[test]
    fn test_gpl_notice_with_holder() {
        let patterns = PatternMatcher::from_catalog(catalog());
        let notice = gpl2_notice_with_holder();
        assert_eq!(patterns.identify_text(&notice), Some("GPL-2.0-or-later"));

        let old = notice.replace(
            "51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.",
            "59 Temple Place, Suite 330, Boston, MA  02111-1307  USA",
        );
        assert_eq!(patterns.identify_text(&old), Some("GPL-2.0-or-later"));
    }

    #[test]
    fn test_gpl_notice_with_extra_restriction_is_unknown() {
        let patterns = PatternMatcher::from_catalog(catalog());
        let restricted = format!(
            "{}\n\nADDITIONAL RESTRICTION: commercial use of this program is prohibited \
             and no redistribution is permitted.",
            gpl2_notice_with_holder()
        );
        assert_eq!(patterns.identify_text(&restricted), None);

        let prefixed = format!("{}{}", "Proprietary. All rights reserved. ".repeat(10), gpl2_notice_with_holder());
        assert_eq!(patterns.identify_text(&prefixed), None);

        let mit = format!("{} Commercial use is prohibited.", mit_with_holder());
        assert_eq!(patterns.identify_text(&mit), None);
    }

    #[test]
    fn test_version_only_notices() {
        let patterns = PatternMatcher::from_catalog(catalog());
        let gpl2 = "Copyright (C) 2020 Jane Doe\n\n\
            This program is free software; you can redistribute it and/or modify it under \
            the terms of the GNU General Public License as published by the Free Software \
            Foundation; version 2 of the License.\n\n\
            This program is distributed in the hope that it will be useful, but WITHOUT ANY \
            WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A \
            PARTICULAR PURPOSE. See the GNU General Public License for more details.\n\n\
            You should have received a copy of the GNU General Public License along with \
            this program; if not, see <https://www.gnu.org/licenses/>.";
        assert_eq!(patterns.identify_text(gpl2), Some("GPL-2.0-only"));

        let gpl3 = canonical("GPL-3.0-or-later").replace(
            "either version 3 of the License, or (at your option) any later version",
            "version 3",
        );
        assert_eq!(patterns.identify_text(&gpl3), Some("GPL-3.0-only"));
        assert_eq!(
            patterns.identify_text(canonical("GPL-3.0-or-later")),
            Some("GPL-3.0-or-later")
        );
    }

    #[test]
    fn test_mpl_notice_matches_mpl() {
        let notice = "This Source Code Form is subject to the terms of the Mozilla Public \
            License, v. 2.0. If a copy of the MPL was not distributed with this file, You can \
            obtain one at https://mozilla.org/MPL/2.0/.";
        let patterns = PatternMatcher::from_catalog(catalog());
        assert_eq!(patterns.identify_text(notice), Some("MPL-2.0"));
    }

    #[test]
    fn test_exact_self_identification() {
        let exact = ExactMatcher::new(catalog().exact_references());
        for (id, text) in catalog().fuzzy_templates() {
            assert_eq!(exact.identify_text(text), Some(id), "exact: {id}");
        }
    }

    #[test]
    fn test_fuzzy_self_identification() {
        let fuzzy = FuzzyMatcher::new(
            catalog().fuzzy_templates(),
            Scoring::TokenDifference,
            DEFAULT_THRESHOLD,
        )
        .unwrap();
        for (id, text) in catalog().fuzzy_templates() {
            assert_eq!(fuzzy.identify_text(text), Some(id), "fuzzy: {id}");
        }
    }

    #[test]
    fn test_pattern_self_identification() {
        let patterns = PatternMatcher::from_catalog(catalog());
        for (id, text) in catalog().fuzzy_templates() {
            assert_eq!(patterns.identify_text(text), Some(id), "pattern: {id}");
        }
    }

    #[test]
    fn test_whitespace_invariance() {
        let exact = ExactMatcher::new(catalog().exact_references());
        let patterns = PatternMatcher::from_catalog(catalog());
        for (id, text) in catalog().fuzzy_templates() {
            let noisy = reformat(text);
            assert_eq!(exact.identify_text(&noisy), exact.identify_text(text), "exact: {id}");
            assert_eq!(
                patterns.identify_text(&noisy),
                patterns.identify_text(text),
                "pattern: {id}"
            );
        }
    }

    #[test]
    fn test_empty_input_policy() {
        let exact = ExactMatcher::new(catalog().exact_references());
        let patterns = PatternMatcher::from_catalog(catalog());
        let strict = FuzzyMatcher::new(catalog().fuzzy_templates(), Scoring::TokenDifference, 0).unwrap();
        let loose = FuzzyMatcher::new(catalog().fuzzy_templates(), Scoring::TokenSet, 0).unwrap();
        let chain = Classifier::standard(catalog()).unwrap();
        for input in ["", " ", "\n\t \r\n"] {
            assert_eq!(exact.identify_text(input), None);
            assert_eq!(patterns.identify_text(input), None);
            assert_eq!(strict.identify_text(input), None);
            assert_eq!(loose.identify_text(input), None);
            assert_eq!(chain.classify(input), None);
        }
    }

    #[test]
    fn test_mit_and_apache_fuzzy_scenario() {
        let fuzzy = FuzzyMatcher::new(
            vec![("MIT", canonical("MIT")), ("Apache-2.0", canonical("Apache-2.0"))],
            Scoring::TokenDifference,
            90,
        )
        .unwrap();

        assert_eq!(fuzzy.identify_text(canonical("MIT")), Some("MIT"));
        assert_eq!(
            fuzzy.identify_text("The quick brown fox jumps over the lazy dog."),
            None
        );
        assert_eq!(
            fuzzy.identify_text(&canonical("MIT").replace(' ', "  ")),
            Some("MIT")
        );
    }

    #[test]
    fn test_real_mit_license_goes_to_pattern() {
        let chain = Classifier::standard(catalog()).unwrap();
        let found = chain.classify(&mit_with_holder()).unwrap();
        assert_eq!(found.identifier, "MIT");
        // A short holder keeps the text within the fuzzy threshold as well.
        assert!(matches!(found.strategy, "fuzzy:token-difference" | "pattern"));

        let patterns = PatternMatcher::from_catalog(catalog());
        assert_eq!(patterns.identify_text(&mit_with_holder()), Some("MIT"));
    }

    #[test]
    fn test_mit_without_title_matches_pattern() {
        let text = mit_with_holder().replacen("MIT License", "", 1);
        let patterns = PatternMatcher::from_catalog(catalog());
        assert_eq!(patterns.identify_text(&text), Some("MIT"));
    }

    #[test]
    fn test_apache_notice_matches_apache() {
        let notice = "Copyright 2023 The Widget Authors\n\n\
            Licensed under the Apache License, Version 2.0 (the \"License\");\n\
            you may not use this file except in compliance with the License.\n\
            You may obtain a copy of the License at\n\n\
            \x20   https://www.apache.org/licenses/LICENSE-2.0\n\n\
            Unless required by applicable law or agreed to in writing, software\n\
            distributed under the License is distributed on an \"AS IS\" BASIS,\n\
            WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.\n\
            See the License for the specific language governing permissions and\n\
            limitations under the License.";
        let patterns = PatternMatcher::from_catalog(catalog());
        assert_eq!(patterns.identify_text(notice), Some("Apache-2.0"));
    }

    #[test]
    fn test_apache_without_appendix_matches_pattern() {
        let full = canonical("Apache-2.0");
        let end = full.find("END OF TERMS AND CONDITIONS").unwrap();
        let trimmed = &full[..end + "END OF TERMS AND CONDITIONS".len()];
        let patterns = PatternMatcher::from_catalog(catalog());
        assert_eq!(patterns.identify_text(trimmed), Some("Apache-2.0"));
    }

    #[test]
    fn test_bsd_clause_count_is_distinguished() {
        let patterns = PatternMatcher::from_catalog(catalog());
        let bsd3 = canonical("BSD-3-Clause").replace("<year> <owner>", "2020, Example Corp.");
        let bsd2 = canonical("BSD-2-Clause").replace("<year> <owner>", "2020, Example Corp.");
        assert_eq!(patterns.identify_text(&bsd3), Some("BSD-3-Clause"));
        assert_eq!(patterns.identify_text(&bsd2), Some("BSD-2-Clause"));
    }

    #[test]
    fn test_token_set_is_looser_than_token_difference() {
        // Every word of the GPL-3.0 notice also occurs in the AGPL-3.0 notice.
        let notices = || {
            vec![
                ("GPL-3.0-or-later", canonical("GPL-3.0-or-later")),
                ("AGPL-3.0-or-later", canonical("AGPL-3.0-or-later")),
            ]
        };
        let agpl = canonical("AGPL-3.0-or-later");
        let strict = FuzzyMatcher::new(notices(), Scoring::TokenDifference, 90).unwrap();
        let loose = FuzzyMatcher::new(notices(), Scoring::TokenSet, 90).unwrap();
        assert_eq!(strict.identify_text(agpl), Some("AGPL-3.0-or-later"));
        assert_eq!(loose.identify_text(agpl), Some("GPL-3.0-or-later"));
    }

    #[test]
    fn test_unrelated_text_is_unknown() {
        let chain = Classifier::standard(catalog()).unwrap();
        assert_eq!(chain.classify("The quick brown fox jumps over the lazy dog."), None);
        assert_eq!(chain.classify("All rights reserved. Do not copy."), None);
    }

    #[test]
    fn test_concurrent_classification_is_deterministic() {
        let chain = Classifier::standard(catalog()).unwrap();
        let inputs: Vec<String> = catalog()
            .fuzzy_templates()
            .map(|(_, text)| reformat(text))
            .chain([mit_with_holder(), "nothing here".to_string()])
            .collect();
        let expected: Vec<Option<String>> = inputs
            .iter()
            .map(|t| chain.classify(t).map(|i| i.identifier.to_string()))
            .collect();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        inputs
                            .iter()
                            .rev()
                            .map(|t| chain.classify(t).map(|i| i.identifier.to_string()))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            for handle in handles {
                let mut got = handle.join().unwrap();
                got.reverse();
                assert_eq!(got, expected);
            }
        });
    }
}
