use crate::cli::PipelineAction;
use crate::context::CliContext;
use crate::output;
use chrono::Utc;
use dealboard_domain::PipelineSummary;

pub async fn handle(ctx: &CliContext, action: PipelineAction) -> anyhow::Result<()> {
    match action {
        PipelineAction::Summary => {
            let board = ctx.workspace.deal_board()?;
            output::output_success(PipelineSummary::from_board(&board, Utc::now()))
        }
    }
}
