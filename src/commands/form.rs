use crate::api::Mode;
use crate::args::FormArgs;
use crate::commands::{reference, start, today, Out};
use crate::form::{self, FormView};
use crate::{Config, Result};

/// Shows the entry form for the chosen transaction type: every visible field, and for each
/// selector its options and default.
///
/// # Errors
/// - The credentials cannot be loaded.
/// - The header row cannot be read.
/// - A transfer is asked for but there is only one account.
pub async fn form(config: Config, mode: Mode, args: FormArgs) -> Result<Out<FormView>> {
    let session = start(config, mode).await?;
    let reference = reference(&session, false).await?;
    let view = form::render(&reference, &args.form_state(), today())?;

    let mut message = view.to_string();
    for note in view.notes() {
        message.push_str(&format!("\n{note}"));
    }
    let warnings = reference
        .warnings
        .iter()
        .chain(view.warnings())
        .cloned()
        .collect::<Vec<_>>();
    Ok(Out::new(message, view).with_warnings(warnings))
}
