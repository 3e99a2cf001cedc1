use clap::{Parser, Subcommand};
use permissions_core::{
    catalog_path_from_env_value, find_matching_option, ConditionId, OptionCatalog, Product,
    RuleBook, ScopeId, ScopeType, SectionKey, CATALOG_FILE_ENV,
};
use scope_wire::{CatalogFile, RuleBookFile};
use std::io::Write;
use std::path::{Path, PathBuf};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "permissions")]
#[command(about = "Build organisational permission rules in rule-book YAML files")]
struct Cli {
    /// Catalog YAML file (defaults to $PERMISSIONS_CATALOG_FILE, then the builtin catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List candidate values for a scope type
    Catalog {
        /// Scope type label, e.g. "Billing Codes"
        scope_type: String,
    },
    /// Resolve free text to the tag that would be stored
    Resolve { scope_type: String, input: String },
    /// Create an empty rule book
    New {
        file: PathBuf,
        /// clear_contracts, analyze or mrf_search
        product: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the rules in a rule book
    Show { file: PathBuf },
    /// Append an empty condition to a section
    AddCondition { file: PathBuf, section: String },
    /// Add an empty scope. Without --condition the section is reset to one new condition.
    AddScope {
        file: PathBuf,
        section: String,
        scope_type: String,
        #[arg(long)]
        condition: Option<ConditionId>,
    },
    /// Add comma-separated tags to a scope
    AddTags {
        file: PathBuf,
        section: String,
        condition: ConditionId,
        scope: ScopeId,
        input: String,
    },
    /// Remove the tag at a zero-based position
    RemoveTag {
        file: PathBuf,
        section: String,
        condition: ConditionId,
        scope: ScopeId,
        index: usize,
    },
    RemoveScope {
        file: PathBuf,
        section: String,
        condition: ConditionId,
        scope: ScopeId,
    },
    RemoveCondition {
        file: PathBuf,
        section: String,
        condition: ConditionId,
    },
}

fn main() {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = run(cli, &mut stdout) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_catalog(flag: Option<PathBuf>) -> CliResult<OptionCatalog> {
    let path = flag.or_else(|| catalog_path_from_env_value(std::env::var(CATALOG_FILE_ENV).ok()));
    Ok(CatalogFile::load(path.as_deref())?)
}

/// Reads `file`, applies `edit` to one section and writes the file back.
fn edit_section<T>(
    file: &Path,
    section: &str,
    edit: impl FnOnce(&mut permissions_core::ConditionTree) -> permissions_core::RuleResult<T>,
) -> CliResult<T> {
    let key: SectionKey = section.parse()?;
    let mut book = RuleBookFile::read(file)?;
    let value = edit(book.tree_mut(key)?)?;
    RuleBookFile::write(file, &book)?;
    Ok(value)
}

fn print_book(book: &RuleBook, out: &mut impl Write) -> CliResult<()> {
    writeln!(out, "Product: {}", book.product().label())?;
    if book.product().sections().is_empty() {
        writeln!(out, "  (no scope rules for this product)")?;
    }
    for (key, tree) in book.sections() {
        writeln!(out, "[{}] {}", key, key.label())?;
        if tree.is_empty() {
            writeln!(out, "  (no conditions)")?;
        }
        for (n, condition) in tree.conditions().iter().enumerate() {
            if n > 0 {
                writeln!(out, "  OR")?;
            }
            writeln!(out, "  condition {}", condition.id())?;
            for scope in condition.scopes() {
                writeln!(
                    out,
                    "    scope {} {}: {}",
                    scope.id(),
                    scope.scope_type(),
                    scope.tag_strings().join(", ")
                )?;
            }
        }
    }
    Ok(())
}

fn run(cli: Cli, out: &mut impl Write) -> CliResult<()> {
    match cli.command {
        Commands::Catalog { scope_type } => {
            let catalog = load_catalog(cli.catalog)?;
            let options = catalog.options_for_label(&scope_type);
            if options.is_empty() {
                writeln!(out, "No options for {}.", scope_type)?;
            }
            for option in options {
                writeln!(out, "{}", option)?;
            }
        }
        Commands::Resolve { scope_type, input } => {
            let catalog = load_catalog(cli.catalog)?;
            let scope_type: ScopeType = scope_type.parse()?;
            match find_matching_option(&catalog, scope_type, &input) {
                Some(tag) => writeln!(out, "{}", tag)?,
                None => writeln!(out, "Nothing to resolve.")?,
            }
        }
        Commands::New {
            file,
            product,
            force,
        } => {
            let product: Product = product.parse()?;
            if file.exists() && !force {
                return Err(format!("{} already exists (use --force)", file.display()).into());
            }
            RuleBookFile::write(&file, &RuleBook::new(product))?;
            writeln!(out, "Created {} rule book at {}", product.label(), file.display())?;
        }
        Commands::Show { file } => {
            let book = RuleBookFile::read(&file)?;
            print_book(&book, out)?;
        }
        Commands::AddCondition { file, section } => {
            let id = edit_section(&file, &section, |tree| tree.add_condition())?;
            writeln!(out, "Added condition {}", id)?;
        }
        Commands::AddScope {
            file,
            section,
            scope_type,
            condition,
        } => {
            let scope_type: ScopeType = scope_type.parse()?;
            let (cid, sid) =
                edit_section(&file, &section, |tree| tree.add_scope(condition, scope_type))?;
            writeln!(out, "Added scope {} to condition {}", sid, cid)?;
        }
        Commands::AddTags {
            file,
            section,
            condition,
            scope,
            input,
        } => {
            let catalog = load_catalog(cli.catalog)?;
            let added = edit_section(&file, &section, |tree| {
                tree.add_tags_from_comma_separated(&catalog, condition, scope, &input)
            })?;
            if added.is_empty() {
                writeln!(out, "No new tags.")?;
            } else {
                writeln!(out, "Added: {}", added.join(", "))?;
            }
        }
        Commands::RemoveTag {
            file,
            section,
            condition,
            scope,
            index,
        } => {
            let removed =
                edit_section(&file, &section, |tree| tree.remove_tag(condition, scope, index))?;
            writeln!(out, "Removed tag {}", removed)?;
        }
        Commands::RemoveScope {
            file,
            section,
            condition,
            scope,
        } => {
            edit_section(&file, &section, |tree| tree.remove_scope(condition, scope))?;
            writeln!(out, "Removed scope {}", scope)?;
        }
        Commands::RemoveCondition {
            file,
            section,
            condition,
        } => {
            edit_section(&file, &section, |tree| tree.remove_condition(condition))?;
            writeln!(out, "Removed condition {}", condition)?;
        }
    }
    Ok(())
}
