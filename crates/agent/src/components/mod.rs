//! Dialogue components
//!
//! Reusable building blocks of a scenario. A component is a plain value
//! describing what to build; [`Component::build`] consumes the dialogue and
//! returns it with one or more turns appended.

mod navigation;
mod purchase;
mod search;
mod search_failure;
mod talk;

pub use navigation::Navigation;
pub use purchase::{select_train, Purchase, SeatFlow, Selection};
pub use search::{Mention, Search, SearchPlan};
pub use search_failure::{FailureKind, SearchFailure};
pub use talk::{Qa, Refusal, RudeDeescalation, SmallTalk, TalkKind};

use railsynth_core::Result;

use crate::dialogue::Dialogue;
use crate::resources::Env;

/// Reusable dialogue building block
pub trait Component {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn build(&self, env: &mut Env<'_>, dialogue: Dialogue) -> Result<Dialogue>;
}

/// Insert `aside` before the closing punctuation of `text`
pub(crate) fn with_aside(text: &str, aside: &str) -> String {
    let trimmed = text.trim_end();
    match trimmed.char_indices().last() {
        Some((index, mark @ ('?' | '!' | '.'))) => {
            format!("{}{}{}", &trimmed[..index], aside, mark)
        }
        _ => format!("{}{}", trimmed, aside),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_aside() {
        assert_eq!(
            with_aside("Treni per Bari?", ", siamo in 3"),
            "Treni per Bari, siamo in 3?"
        );
        assert_eq!(with_aside("Prendo il primo", " in prima classe"), "Prendo il primo in prima classe");
    }
}
