//! Code listing and lookup.

use tabled::Tabled;

use promokit_core::{CodeFilter, Desk, DeskConfig, PromoCode, StatusKind};

use crate::cli::{CodesArgs, CodesCommand, GlobalOpts, StatusFilter};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CodeRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Redeemed")]
    redeemed: String,
    #[tabled(rename = "Customer")]
    customer: String,
}

impl CodeRow {
    fn from_code(code: &PromoCode, color: bool) -> Self {
        Self {
            code: code.code.clone(),
            description: code.description.clone(),
            value: code.value.clone(),
            status: output::paint_status(&code.status.kind().to_string(), color),
            redeemed: code.redemption_date().unwrap_or("-").to_owned(),
            customer: code.customer.clone().unwrap_or_default(),
        }
    }
}

fn detail(code: &PromoCode) -> String {
    let mut lines = vec![
        format!("Code:         {}", code.code),
        format!("ID:           {}", code.id),
        format!("Description:  {}", code.description),
        format!("Value:        {}", code.value),
        format!("Status:       {}", code.status.kind()),
    ];
    if let Some(date) = code.redemption_date() {
        lines.push(format!("Redeemed on:  {date}"));
    }
    if let Some(ref bonus) = code.bonus_item {
        lines.push(format!("Bonus item:   {bonus}"));
    }
    if let Some(ref customer) = code.customer {
        lines.push(format!("Customer:     {customer}"));
    }
    lines.join("\n")
}

impl From<StatusFilter> for CodeFilter {
    fn from(status: StatusFilter) -> Self {
        match status {
            StatusFilter::Active => Self::ByStatus(StatusKind::Active),
            StatusFilter::Redeemed => Self::ByStatus(StatusKind::Redeemed),
            StatusFilter::All => Self::All,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: CodesArgs,
    config: &DeskConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        CodesCommand::List { search, status } => {
            let predicate = CodeFilter::from(status);
            let term = search.unwrap_or_default();
            let codes = Desk::oneshot(config, |desk| async move {
                Ok(desk.list(&predicate, &term))
            })
            .await?;

            let out = output::render_list(
                &global.output,
                &codes,
                |c| CodeRow::from_code(c, color),
                |c| c.code.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CodesCommand::Get { code } => {
            let lookup = code.clone();
            let found = Desk::oneshot(config, |desk| async move { Ok(desk.find(&lookup)) })
                .await?
                .ok_or_else(|| CliError::CodeNotFound {
                    code: code.trim().to_owned(),
                })?;

            let out = output::render_single(&global.output, &found, detail, |c| c.code.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
