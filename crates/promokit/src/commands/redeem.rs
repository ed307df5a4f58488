//! Redemption: local check, confirmation, then one sink call.

use promokit_core::engine::validate;
use promokit_core::{Desk, DeskConfig, Notice, RedemptionAttempt, RedemptionResult};

use crate::cli::{GlobalOpts, RedeemArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

pub async fn handle(
    args: RedeemArgs,
    config: &DeskConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let desk = Desk::new(config)?;
    desk.connect().await?;
    let outcome = redeem(&desk, &args.code, global.yes).await;
    desk.disconnect().await;
    let result = outcome?;

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &result,
        |r| output::render_notice(&Notice::redeemed(r), color),
        |r| r.code.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn redeem(desk: &Desk, code: &str, yes: bool) -> Result<RedemptionResult, CliError> {
    // Unknown and already-redeemed codes are answered before prompting.
    let prompt = {
        let snapshot = desk.snapshot();
        let record = validate(&snapshot, &RedemptionAttempt::new(code))?;
        format!(
            "Redeem {} ({}, {})?",
            record.code, record.description, record.value
        )
    };

    if !util::confirm(&prompt, "redeem", yes)? {
        return Err(CliError::Aborted);
    }

    Ok(desk.submit(code).await?)
}
