//! Item command handlers.
//!
//! Writes go through an edit session: begin, fill the draft, save. The
//! core validates the draft and uploads any image before the item itself.

use std::sync::Arc;

use tabled::Tabled;

use catalog_core::{
    Command as CoreCommand, CommandResult, Controller, DraftUpdate, Item, SessionTarget,
};

use crate::cli::{GlobalOpts, ItemFields, ItemsArgs, ItemsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Image")]
    image: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn category_name(controller: &Controller, item: &Item) -> String {
    controller
        .store()
        .category_by_id(item.category_id)
        .map_or_else(|| item.category_id.to_string(), |c| c.name.clone())
}

fn detail(controller: &Controller, item: &Arc<Item>) -> String {
    let mut lines = vec![
        format!("ID:        {}", item.id),
        format!("Name:      {}", item.name),
        format!("Category:  {}", category_name(controller, item)),
        format!(
            "Owner:     {}",
            item.owner_id.map_or_else(|| "-".into(), |o| o.to_string())
        ),
        format!("Created:   {}", util::created_label(&item.created_on)),
    ];
    if let Some(ref url) = item.image_url {
        lines.push(format!("Image:     {url}"));
    }
    if !item.description.is_empty() {
        lines.push(String::new());
        lines.push(item.description.clone());
    }
    lines.join("\n")
}

fn print_item(controller: &Controller, item: &Arc<Item>, global: &GlobalOpts) {
    let out = output::render_single(
        &global.output,
        item,
        |i| detail(controller, i),
        |i| i.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

/// Fill the open session's draft and save it.
async fn save_draft(controller: &Controller, update: DraftUpdate) -> Result<Arc<Item>, CliError> {
    controller
        .execute(CoreCommand::UpdateDraft(update))
        .await?;
    match controller.execute(CoreCommand::SaveItem).await? {
        CommandResult::Item(item) => Ok(item),
        other => Err(CliError::ApiError {
            code: "unexpected".into(),
            message: format!("expected an item, got {other:?}"),
        }),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ItemsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ItemsCommand::List { category, all } => {
            let items = if all {
                controller.items_snapshot().to_vec()
            } else {
                if category.is_some() {
                    controller
                        .execute(CoreCommand::SelectCategory(category))
                        .await?;
                }
                controller.visible_items()
            };
            let user = controller.user();
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &items,
                |i| ItemRow {
                    id: i.id.to_string(),
                    name: i.name.clone(),
                    category: category_name(controller, i),
                    image: if i.image_id.is_some() {
                        "yes".into()
                    } else {
                        output::dim("-", color)
                    },
                    owner: util::owner_label(i.owner_id, user, color),
                    created: util::created_label(&i.created_on),
                },
                |i| i.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ItemsCommand::Get { id } => {
            let item = controller
                .store()
                .item_by_id(id)
                .ok_or(catalog_core::CoreError::NotFound(id.into()))?;
            print_item(controller, &item, global);
            Ok(())
        }

        ItemsCommand::Add {
            name,
            category,
            description,
            image,
        } => {
            let image = image.as_deref().map(util::stage_image).transpose()?;
            controller
                .execute(CoreCommand::BeginEdit(SessionTarget::New))
                .await?;
            let item = save_draft(
                controller,
                DraftUpdate {
                    name: Some(name),
                    description: Some(description),
                    category_id: Some(category),
                    image,
                },
            )
            .await?;
            print_item(controller, &item, global);
            Ok(())
        }

        ItemsCommand::Edit { id, fields } => {
            let ItemFields {
                name,
                description,
                category,
                image,
            } = fields;
            let image = image.as_deref().map(util::stage_image).transpose()?;
            controller
                .execute(CoreCommand::BeginEdit(SessionTarget::Existing(id)))
                .await?;
            let item = save_draft(
                controller,
                DraftUpdate {
                    name,
                    description,
                    category_id: category,
                    image,
                },
            )
            .await?;
            print_item(controller, &item, global);
            Ok(())
        }

        ItemsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete item {id}?"), "items delete", global.yes)? {
                return Ok(());
            }
            controller.execute(CoreCommand::DeleteItem { id }).await?;
            if !global.quiet {
                eprintln!("Item {id} deleted");
            }
            Ok(())
        }
    }
}
