//! The WHATWG basic URL parser: state machine, URL record, and the
//! serialization writer.

mod machine;
mod record;
mod state;

pub use machine::ValidationError;
pub use state::State;

pub(crate) use record::{PathForm, UrlRecord};

use crate::error::Result;
use crate::helpers::clean_input;

/// Parse `input` (with an optional base record) into a fresh record.
pub(crate) fn parse_record(
    input: &str,
    base: Option<&UrlRecord>,
    mut reporter: Option<&mut dyn FnMut(ValidationError)>,
) -> Result<UrlRecord> {
    let cleaned = clean_input(input);
    if cleaned != input
        && let Some(reporter) = reporter.as_mut()
    {
        (**reporter)(ValidationError::InvalidUrlUnit);
    }

    let mut url = UrlRecord::new();
    machine::run(&cleaned, base, &mut url, None, reporter)?;
    Ok(url)
}

/// Re-enter the machine over an existing record, starting at
/// `state_override`. Used by the setters; `url` is only meaningful if
/// the run succeeds.
pub(crate) fn parse_component(
    input: &str,
    url: &mut UrlRecord,
    state_override: State,
) -> Result<()> {
    let cleaned = clean_input(input);
    machine::run(&cleaned, None, url, Some(state_override), None)
}
