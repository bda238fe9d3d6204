use crate::commands::{connect, CommandResult};

pub fn run() -> CommandResult {
    let context = match connect("hierarchy") {
        Ok(context) => context,
        Err(failure) => return failure,
    };

    match context.runtime.block_on(context.services.org_units.hierarchy()) {
        Ok(roots) => CommandResult::data("hierarchy", &roots),
        Err(error) => CommandResult::api_failure("hierarchy", &error),
    }
}
