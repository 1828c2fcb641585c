use crate::cli::{CloseOutcome, DealAction};
use crate::context::CliContext;
use crate::output;
use chrono::Utc;
use dealboard_domain::CloseStatus;

pub async fn handle(ctx: &mut CliContext, action: DealAction) -> anyhow::Result<()> {
    match action {
        DealAction::Add {
            title,
            stage,
            value,
        } => {
            if !value.is_finite() || value < 0.0 {
                return output::output_error(&format!("Invalid deal value: {}", value));
            }
            let policy = *ctx.policy();
            let deal = ctx
                .workspace
                .add_deal(title, stage, value, &policy)?
                .clone();
            ctx.save().await?;
            output::output_success(&deal)
        }
        DealAction::Close { id, status, reason } => {
            let status = match status {
                CloseOutcome::Won => CloseStatus::Won,
                CloseOutcome::Lost => CloseStatus::Lost {
                    reason: reason.unwrap_or_default(),
                },
            };
            let deal = ctx.workspace.close_deal(id, status, Utc::now())?.clone();
            ctx.save().await?;
            tracing::info!("Closed deal {} (lost: {})", deal.id, deal.is_lost());
            output::output_success(&deal)
        }
    }
}
