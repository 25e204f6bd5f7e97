use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use doc_model::{GuidePatch, GuideStatus, GuideUpload, NoteField, ProjectAction};
use guidelens_core::{export, ExportFormat, Workspace, WorkspaceConfig};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use viewer_core::{
    InteractionMachine, InteractionState, PixelPoint, PixelRect, SelectionCapture, TagAttachment,
    UniformPageSurface,
};

#[derive(Debug, Parser)]
#[command(name = "guidelens")]
#[command(about = "GuideLens annotation workspace")]
pub struct Cli {
    /// Directory for the local store and the remembered project directory.
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Never use a project directory, even if one was granted before.
    #[arg(long, global = true)]
    no_directory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Grant a project directory, or go back to local storage.
    Init {
        #[arg(long, value_name = "DIR", conflicts_with = "local")]
        dir: Option<PathBuf>,
        #[arg(long)]
        local: bool,
    },
    /// Print storage mode and project counts as JSON.
    Status,
    /// Add a guide from a file.
    Upload {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long)]
        title: Option<String>,
    },
    /// List guides.
    Guides,
    /// Move a guide through its review lifecycle.
    SetStatus {
        guide: String,
        #[arg(value_parser = parse_status)]
        status: GuideStatus,
    },
    /// Highlight text on a page.
    Highlight(HighlightArgs),
    #[command(subcommand)]
    Tag(TagCommand),
    /// Set one field of a dimension's analysis notes.
    Notes {
        guide: String,
        dimension: String,
        #[arg(value_parser = parse_note_field)]
        field: NoteField,
        value: String,
    },
    /// Export summary rows.
    Export {
        #[arg(long, default_value = "json")]
        format: ExportFormat,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace the project with an exported project document.
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Args)]
struct HighlightArgs {
    guide: String,
    #[arg(long)]
    page: u32,
    #[arg(long)]
    text: String,
    #[arg(long)]
    dimension: String,
    /// Selection rect in page points as `left,top,width,height` (US Letter).
    #[arg(long = "rect", value_parser = parse_rect, required = true)]
    rects: Vec<PixelRect>,
    #[arg(long)]
    comment: Option<String>,
    /// Attach this tag to the new highlight.
    #[arg(long)]
    tag: Option<String>,
}

#[derive(Debug, Subcommand)]
enum TagCommand {
    /// Create a tag in a dimension of a guide.
    Create {
        guide: String,
        #[arg(long)]
        dimension: String,
        #[arg(long)]
        label: String,
        #[arg(long)]
        color: Option<String>,
    },
    /// Attach a tag to a highlight, replacing the comment of an existing link.
    Attach {
        tag: String,
        highlight: String,
        #[arg(long)]
        comment: Option<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusOutput {
    mode: String,
    directory: Option<String>,
    directory_supported: bool,
    guides: usize,
    highlights: usize,
    tags: usize,
    drawings: usize,
    last_error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadOutput {
    guide_id: String,
    title: String,
    created: bool,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    if let Commands::Version = cli.command {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let workspace = open_workspace(cli.data_dir.as_deref(), cli.no_directory)?;
    let result = dispatch(&workspace, cli.command);
    workspace.shutdown().context("failed to save project")?;
    result
}

fn open_workspace(data_dir: Option<&Path>, no_directory: bool) -> Result<Workspace> {
    let mut config = WorkspaceConfig::from_env().context("invalid environment configuration")?;
    if let Some(data_dir) = data_dir {
        config = config.with_data_dir(data_dir);
    }
    if no_directory {
        config = config.with_directory_access(false);
    }

    Workspace::open(config).context("failed to open workspace")
}

fn dispatch(workspace: &Workspace, command: Commands) -> Result<()> {
    match command {
        Commands::Init { dir, local } => run_init(workspace, dir.as_deref(), local),
        Commands::Status => run_status(workspace),
        Commands::Upload { file, title } => run_upload(workspace, &file, title),
        Commands::Guides => run_guides(workspace),
        Commands::SetStatus { guide, status } => {
            workspace.store().apply(ProjectAction::UpdateGuide {
                guide_id: guide,
                patch: GuidePatch { status: Some(status), ..Default::default() },
            })?;
            Ok(())
        }
        Commands::Highlight(args) => run_highlight(workspace, args),
        Commands::Tag(command) => run_tag(workspace, command),
        Commands::Notes { guide, dimension, field, value } => {
            workspace.store().apply(ProjectAction::UpdateSheetNotes {
                guide_id: guide,
                dimension_id: dimension,
                field,
                value,
            })?;
            Ok(())
        }
        Commands::Export { format, output } => run_export(workspace, format, output.as_deref()),
        Commands::Import { file } => {
            let json = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            workspace.store().import_json(&json)?;
            Ok(())
        }
        Commands::Version => Ok(()),
    }
}

fn run_init(workspace: &Workspace, dir: Option<&Path>, local: bool) -> Result<()> {
    match dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
            workspace
                .select_directory(dir)
                .with_context(|| format!("failed to use {} as project directory", dir.display()))?;
        }
        None if local => workspace.clear_directory()?,
        None => bail!("pass --dir <DIR> or --local"),
    }

    println!("{}", workspace.mode());
    Ok(())
}

fn run_status(workspace: &Workspace) -> Result<()> {
    let status = workspace.store().status();
    let payload = workspace.store().read(|project| StatusOutput {
        mode: workspace.mode().to_string(),
        directory: workspace.directory().map(|dir| dir.display().to_string()),
        directory_supported: workspace.storage().is_directory_supported(),
        guides: project.guides.len(),
        highlights: project.highlights.len(),
        tags: project.tags.len(),
        drawings: project.drawings.len(),
        last_error: status.last_error,
    });

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run_upload(workspace: &Workspace, file: &Path, title: Option<String>) -> Result<()> {
    ensure_file_exists(file)?;

    let bytes = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .context("file name is not valid UTF-8")?;

    let store = workspace.store();
    let outcome = store.upload_guide(GuideUpload::new(file_name, bytes))?;

    if let (Some(title), true) = (title, outcome.is_new()) {
        store.apply(ProjectAction::UpdateGuide {
            guide_id: outcome.guide_id().to_owned(),
            patch: GuidePatch { title: Some(title), ..Default::default() },
        })?;
    }

    let payload = UploadOutput {
        guide_id: outcome.guide_id().to_owned(),
        title: store
            .read(|project| project.guide(outcome.guide_id()).map(|guide| guide.title.clone()))
            .unwrap_or_default(),
        created: outcome.is_new(),
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run_guides(workspace: &Workspace) -> Result<()> {
    workspace.store().read(|project| {
        for guide in &project.guides {
            println!("{}\t{}\t{}", guide.id, guide.status.as_str(), guide.title);
        }
    });
    Ok(())
}

fn run_highlight(workspace: &Workspace, args: HighlightArgs) -> Result<()> {
    if args.page == 0 {
        bail!("--page is 1-based and must be >= 1");
    }

    let (width, height) = UniformPageSurface::LETTER;
    let surface = UniformPageSurface::new(args.page, width, height);
    let client_rects = args
        .rects
        .iter()
        .map(|rect| {
            let origin = surface
                .to_viewport(args.page, PixelPoint::new(rect.left, rect.top))
                .context("page is not laid out")?;
            Ok(PixelRect::new(origin.x, origin.y, rect.width, rect.height))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut machine = InteractionMachine::new();
    machine.selection_completed(
        &surface,
        SelectionCapture {
            text: args.text,
            page_number: Some(args.page),
            client_rects,
            start_offset: None,
            end_offset: None,
        },
    );
    if !matches!(machine.state(), InteractionState::SelectionPending(_)) {
        bail!("selection has no text or no rect with area on page {}", args.page);
    }

    let attach = args.tag.map(|tag_id| TagAttachment { tag_id, comment: None });
    let output = machine.confirm_selection(args.dimension, args.comment, attach);

    for intent in &output.intents {
        let outcome = workspace.store().apply_intent(&args.guide, intent)?;
        if let Some(id) = outcome.created_id() {
            println!("{id}");
        }
    }
    Ok(())
}

fn run_tag(workspace: &Workspace, command: TagCommand) -> Result<()> {
    match command {
        TagCommand::Create { guide, dimension, label, color } => {
            let outcome = workspace.store().apply(ProjectAction::CreateTag {
                guide_id: guide,
                dimension_id: dimension,
                label,
                color,
            })?;
            if let Some(id) = outcome.created_id() {
                println!("{id}");
            }
        }
        TagCommand::Attach { tag, highlight, comment } => {
            workspace.store().apply(ProjectAction::AttachTag {
                tag_id: tag,
                highlight_id: highlight,
                comment,
            })?;
        }
    }
    Ok(())
}

fn run_export(workspace: &Workspace, format: ExportFormat, output: Option<&Path>) -> Result<()> {
    let rendered = workspace.store().read(|project| export(project, format))?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, rendered)
                .with_context(|| format!("failed to write export to {}", path.display()))?;
            println!("{}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        bail!("path is not a file: {}", path.display());
    }

    Ok(())
}

fn parse_status(value: &str) -> Result<GuideStatus, String> {
    GuideStatus::parse(value).ok_or_else(|| {
        let known: Vec<_> = GuideStatus::ALL.iter().map(|status| status.as_str()).collect();
        format!("expected one of {}", known.join(", "))
    })
}

fn parse_note_field(value: &str) -> Result<NoteField, String> {
    NoteField::parse(value)
        .ok_or_else(|| "expected descriptive, quotations, interpretive or memo".to_owned())
}

fn parse_rect(value: &str) -> Result<PixelRect, String> {
    let parts = value
        .split(',')
        .map(|part| f64::from_str(part.trim()).map_err(|error| format!("{part:?}: {error}")))
        .collect::<Result<Vec<_>, _>>()?;

    match parts.as_slice() {
        [left, top, width, height] => Ok(PixelRect::new(*left, *top, *width, *height)),
        _ => Err("expected left,top,width,height".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_argument_parses_four_numbers() {
        assert_eq!(parse_rect("72, 100,180,14"), Ok(PixelRect::new(72.0, 100.0, 180.0, 14.0)));
        assert!(parse_rect("1,2,3").is_err());
        assert!(parse_rect("a,b,c,d").is_err());
    }

    #[test]
    fn status_argument_uses_snake_case() {
        assert_eq!(parse_status("in_review"), Ok(GuideStatus::InReview));
        assert!(parse_status("done").unwrap_err().contains("not_started"));
    }
}
