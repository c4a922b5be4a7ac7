//! Catalog category handlers. The categories endpoint needs no token.

use tabled::Tabled;

use iem_core::iem_api::Category;
use iem_core::resolve;

use crate::cli::CategoriesCommand;
use crate::error::CliError;
use crate::output;

use super::{Context, util};

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&Category> for CategoryRow {
    fn from(c: &Category) -> Self {
        Self {
            id: c.category_id.clone(),
            name: c.name.clone(),
        }
    }
}

pub async fn handle(cmd: CategoriesCommand, ctx: &Context<'_>) -> Result<(), CliError> {
    match cmd {
        CategoriesCommand::List => {
            let response = ctx.client.list_categories().await?;
            ctx.print(&output::render_list(
                ctx.format,
                &response,
                |c| CategoryRow::from(c),
                |c| c.category_id.clone(),
            ));
        }
        CategoriesCommand::Id { name } => {
            let id = resolve::resolve_category_id(ctx.client, &name).await?;
            let response = util::resolved("Category ID", id);
            ctx.print(&output::render_single(ctx.format, &response, Clone::clone));
        }
    }
    Ok(())
}
