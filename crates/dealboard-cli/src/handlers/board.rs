use crate::cli::{BoardAction, BoardKind, MoveArgs};
use crate::context::CliContext;
use crate::output;
use dealboard_core::BoardItem;
use dealboard_domain::{Board, Move, TaskStatus};
use dealboard_persistence::{PositionSink, WorkspaceStore};
use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize)]
struct ColumnView<'a, B, C> {
    bucket: &'a B,
    count: usize,
    cards: &'a [C],
}

#[derive(Serialize)]
struct CardLocation<'a, B> {
    id: Uuid,
    bucket: &'a B,
    index: usize,
}

pub async fn handle(ctx: &mut CliContext, action: BoardAction) -> anyhow::Result<()> {
    match action {
        BoardAction::Show { kind } => match kind {
            BoardKind::Tasks => show(&ctx.workspace.task_board()?),
            BoardKind::Deals => show(&ctx.workspace.deal_board()?),
        },
        BoardAction::Move(args) => handle_move(ctx, args).await,
        BoardAction::Locate { kind, id } => match kind {
            BoardKind::Tasks => locate(&ctx.workspace.task_board()?, id),
            BoardKind::Deals => locate(&ctx.workspace.deal_board()?, id),
        },
        BoardAction::Compact { kind, bucket } => match kind {
            BoardKind::Tasks => {
                let board = ctx.workspace.task_board()?;
                compact(ctx, board, parse_status(&bucket)?).await
            }
            BoardKind::Deals => {
                let board = ctx.workspace.deal_board()?;
                compact(ctx, board, bucket).await
            }
        },
    }
}

async fn handle_move(ctx: &mut CliContext, args: MoveArgs) -> anyhow::Result<()> {
    match args.kind {
        BoardKind::Tasks => {
            let board = ctx.workspace.task_board()?;
            let mv = Move::new(
                parse_status(&args.from)?,
                args.from_index,
                parse_status(&args.to)?,
                args.to_index,
            );
            move_card(ctx, board, mv).await
        }
        BoardKind::Deals => {
            let board = ctx.workspace.deal_board()?;
            let mv = Move::new(args.from, args.from_index, args.to, args.to_index);
            move_card(ctx, board, mv).await
        }
    }
}

fn parse_status(value: &str) -> anyhow::Result<TaskStatus> {
    value.parse().map_err(anyhow::Error::msg)
}

fn show<C>(board: &Board<C>) -> anyhow::Result<()>
where
    C: BoardItem + Serialize,
    C::Bucket: Serialize,
{
    let columns: Vec<_> = board
        .iter()
        .map(|(bucket, cards)| ColumnView {
            bucket,
            count: cards.len(),
            cards,
        })
        .collect();
    output::output_list(columns)
}

fn locate<C>(board: &Board<C>, id: Uuid) -> anyhow::Result<()>
where
    C: BoardItem<Id = Uuid>,
    C::Bucket: Serialize,
{
    match board.find(&id) {
        Some((bucket, index)) => output::output_success(CardLocation { id, bucket, index }),
        None => output::output_error(&format!("Card not found: {}", id)),
    }
}

async fn move_card<C>(
    ctx: &mut CliContext,
    board: Board<C>,
    mv: Move<C::Bucket>,
) -> anyhow::Result<()>
where
    C: BoardItem,
    C::Id: Send + Sync + Serialize,
    C::Bucket: Send + Sync + Serialize,
    WorkspaceStore: PositionSink<C>,
{
    let (_, updates) = ctx.reconciler.apply_move(&board, &mv)?;
    let written = ctx.persist::<C>(&updates).await?;
    tracing::info!(
        "Moved {}[{}] to {}[{}], wrote {} positions",
        mv.source_bucket,
        mv.source_index,
        mv.dest_bucket,
        mv.dest_index,
        written
    );
    output::output_list(updates)
}

async fn compact<C>(
    ctx: &mut CliContext,
    mut board: Board<C>,
    bucket: C::Bucket,
) -> anyhow::Result<()>
where
    C: BoardItem,
    C::Id: Send + Sync + Serialize,
    C::Bucket: Send + Sync + Serialize,
    WorkspaceStore: PositionSink<C>,
{
    let updates = ctx.reconciler.compact(&mut board, &bucket)?;
    ctx.persist::<C>(&updates).await?;
    output::output_list(updates)
}
