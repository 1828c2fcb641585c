use crate::cli::TaskAction;
use crate::context::CliContext;
use crate::output;
use dealboard_domain::TaskStatus;

pub async fn handle(ctx: &mut CliContext, action: TaskAction) -> anyhow::Result<()> {
    match action {
        TaskAction::Add { title, status } => {
            let status: TaskStatus = status.parse().map_err(anyhow::Error::msg)?;
            let policy = *ctx.policy();
            let task = ctx.workspace.add_task(title, status, &policy).clone();
            ctx.save().await?;
            output::output_success(&task)
        }
    }
}
