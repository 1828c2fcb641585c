use crate::cli::StageAction;
use crate::context::CliContext;
use crate::output;

pub async fn handle(ctx: &mut CliContext, action: StageAction) -> anyhow::Result<()> {
    match action {
        StageAction::Add { name, order } => {
            let order = order.unwrap_or_else(|| {
                ctx.workspace
                    .stages
                    .iter()
                    .map(|s| s.order.saturating_add(1))
                    .max()
                    .unwrap_or(1)
            });
            let stage = ctx.workspace.add_stage(name, order)?.clone();
            ctx.save().await?;
            tracing::info!(
                "Added stage '{}' to {}",
                stage.name,
                ctx.file_path().display()
            );
            output::output_success(&stage)
        }
        StageAction::Reorder { name, order } => {
            let stage = ctx.workspace.reorder_stage(&name, order)?.clone();
            ctx.save().await?;
            output::output_success(&stage)
        }
        StageAction::List => {
            let mut stages = ctx.workspace.stages.clone();
            stages.sort_by_key(|s| s.order);
            output::output_list(stages)
        }
    }
}
