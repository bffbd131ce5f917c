use colored::*;
use umbra_common::config::Config;
use umbra_common::deletion::DeletionMethod;

use crate::mprint;
use crate::terminal::{colors, format, print};

pub fn methods(cfg: &Config) {
    for (idx, method) in DeletionMethod::ALL.iter().enumerate() {
        if cfg.quiet > 1 {
            print::print(method.key());
            continue;
        }

        print::tree_head(idx, method.display_name());
        print::as_tree_one_level(vec![
            ("Key".to_string(), method.key().color(colors::ACCENT)),
            (
                "Passes".to_string(),
                method.pass_count().to_string().color(colors::TEXT_DEFAULT),
            ),
            ("Security".to_string(), format::security_level(method.security_level())),
            ("About".to_string(), method.description().normal()),
        ]);

        if idx + 1 != DeletionMethod::ALL.len() {
            mprint!();
        }
    }
}
