//! Category command handlers.

use std::sync::Arc;

use tabled::Tabled;

use catalog_core::{Category, Command as CoreCommand, CommandResult, Controller};

use crate::cli::{CategoriesArgs, CategoriesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Items")]
    items: usize,
    #[tabled(rename = "Owner")]
    owner: String,
}

fn detail(c: &Arc<Category>) -> String {
    [
        format!("ID:     {}", c.id),
        format!("Name:   {}", c.name),
        format!(
            "Owner:  {}",
            c.owner_id.map_or_else(|| "-".into(), |o| o.to_string())
        ),
    ]
    .join("\n")
}

fn expect_category(result: CommandResult) -> Result<Arc<Category>, CliError> {
    match result {
        CommandResult::Category(category) => Ok(category),
        other => Err(CliError::ApiError {
            code: "unexpected".into(),
            message: format!("expected a category, got {other:?}"),
        }),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: CategoriesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CategoriesCommand::List { mine } => {
            let user = controller.user();
            let snap: Vec<Arc<Category>> = match (mine, user) {
                (true, Some(user)) => controller.store().categories_by_owner(user),
                (true, None) => return Err(CliError::NotSignedIn),
                (false, _) => controller.categories_snapshot().to_vec(),
            };
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &snap,
                |c| CategoryRow {
                    id: c.id.to_string(),
                    name: c.name.clone(),
                    items: controller.store().items_in_category(c.id).len(),
                    owner: util::owner_label(c.owner_id, user, color),
                },
                |c| c.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CategoriesCommand::Add { name } => {
            let created =
                expect_category(controller.execute(CoreCommand::CreateCategory { name }).await?)?;
            let out = output::render_single(&global.output, &created, detail, |c| c.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CategoriesCommand::Rename { id, name } => {
            let renamed = expect_category(
                controller
                    .execute(CoreCommand::RenameCategory { id, name })
                    .await?,
            )?;
            if !global.quiet {
                eprintln!("Category {} renamed to '{}'", renamed.id, renamed.name);
            }
            Ok(())
        }

        CategoriesCommand::Delete { id } => {
            let items = controller.store().items_in_category(id).len();
            let prompt = format!("Delete category {id} and its {items} item(s)?");
            if !util::confirm(&prompt, "categories delete", global.yes)? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeleteCategory { id })
                .await?;
            if !global.quiet {
                eprintln!("Category {id} deleted");
            }
            Ok(())
        }
    }
}
