//! `pantry` command line: argument definitions and command execution.

use std::io::Write;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};

use pantry_core::PantryItemId;
use pantry_inventory::{PantryItem, SortKey, capitalize, format_timestamp};

use crate::controller::{ListRow, PantryList};
use crate::form::ItemForm;

#[derive(Parser)]
#[command(
    name = "pantry",
    version,
    about = "Track what is in the pantry",
    long_about = "Search, add, edit and consume pantry items.\n\n\
        The store is chosen from the environment (PANTRY_STORE_BACKEND, \
        PANTRY_FIRESTORE_PROJECT_ID, PANTRY_FIRESTORE_API_KEY, PANTRY_FIRESTORE_BASE_URL)."
)]
pub struct Cli {
    #[arg(long, global = true, help = "Print machine-readable JSON")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        help = "Human-readable log lines on stderr instead of JSON (filter with RUST_LOG)"
    )]
    pub plain_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(about = "List items, optionally filtered and sorted")]
    List {
        #[arg(short, long, default_value = "", help = "Search text (name, or most of category/user id)")]
        query: String,
        #[arg(
            short,
            long,
            default_value = "none",
            help = "Sort key: none|category|expiryDate|addedDate|userId"
        )]
        sort: SortKey,
    },
    #[command(about = "Add a new item")]
    Add(AddArgs),
    #[command(about = "Edit an existing item; omitted fields keep their value")]
    Edit {
        #[arg(help = "Item id")]
        id: PantryItemId,
        #[command(flatten)]
        fields: EditArgs,
    },
    #[command(name = "remove-one", about = "Consume one unit (deletes the item at the last one)")]
    RemoveOne {
        #[arg(help = "Item id")]
        id: PantryItemId,
    },
    #[command(about = "Show every field of one item")]
    Show {
        #[arg(help = "Item id")]
        id: PantryItemId,
    },
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    category: String,
    #[arg(long, default_value = "1")]
    quantity: String,
    #[arg(long, help = "Expiry date (YYYY-MM-DD or RFC 3339)")]
    expiry: String,
    #[arg(long)]
    user: String,
}

#[derive(Args)]
pub struct EditArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    quantity: Option<String>,
    #[arg(long, help = "Expiry date (YYYY-MM-DD or RFC 3339)")]
    expiry: Option<String>,
    #[arg(long)]
    user: Option<String>,
}

impl EditArgs {
    fn apply(self, form: &mut ItemForm) {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(category) = self.category {
            form.category = category;
        }
        if let Some(quantity) = self.quantity {
            form.quantity = quantity;
        }
        if let Some(expiry) = self.expiry {
            form.expiry_date = expiry;
        }
        if let Some(user) = self.user {
            form.user_id = user;
        }
    }
}

/// Execute one command against `list`, writing results to `out`.
pub async fn run<W: Write>(
    command: Command,
    json: bool,
    list: &PantryList,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::List { query, sort } => {
            list.set_query(query);
            list.set_sort_key(sort);
            list.cancel_pending();
            list.refresh().await.context("failed to load pantry items")?;
            print_rows(out, &list.rows(), json)
        }
        Command::Add(args) => {
            let form = ItemForm {
                name: args.name,
                category: args.category,
                quantity: args.quantity,
                expiry_date: args.expiry,
                user_id: args.user,
            };
            let notice = list.submit(form).await?;
            writeln!(out, "{notice}")?;
            Ok(())
        }
        Command::Edit { id, fields } => {
            load(list).await?;
            let Some(mut form) = list.begin_edit(&id) else {
                bail!("no pantry item with id {id}");
            };
            fields.apply(&mut form);
            let notice = list.submit(form).await?;
            writeln!(out, "{notice}")?;
            Ok(())
        }
        Command::RemoveOne { id } => {
            load(list).await?;
            match list.remove_one(&id).await? {
                Some(notice) => {
                    writeln!(out, "{notice}")?;
                    Ok(())
                }
                None => bail!("no pantry item with id {id}"),
            }
        }
        Command::Show { id } => {
            load(list).await?;
            let Some(item) = list.select(&id) else {
                bail!("no pantry item with id {id}");
            };
            print_item(out, &item, json)
        }
    }
}

async fn load(list: &PantryList) -> anyhow::Result<()> {
    list.refresh().await.context("failed to load pantry items")?;
    Ok(())
}

fn print_rows<W: Write>(out: &mut W, rows: &[ListRow], json: bool) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(rows)?)?;
        return Ok(());
    }
    if rows.is_empty() {
        writeln!(out, "No items found.")?;
    }
    for row in rows {
        writeln!(out, "{}\t{}\t{}", row.id, row.title, row.secondary)?;
    }
    Ok(())
}

fn print_item<W: Write>(out: &mut W, item: &PantryItem, json: bool) -> anyhow::Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(item)?)?;
        return Ok(());
    }
    writeln!(out, "Name: {}", capitalize(item.name()))?;
    writeln!(out, "Category: {}", capitalize(item.category()))?;
    writeln!(out, "Quantity: {}", item.quantity())?;
    writeln!(out, "Expiry Date: {}", format_timestamp(&item.expiry_date()))?;
    writeln!(out, "Added Date: {}", format_timestamp(&item.added_date()))?;
    writeln!(out, "User ID: {}", capitalize(item.user_id()))?;
    Ok(())
}
