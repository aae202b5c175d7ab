use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use flex_masonry::{
    InMemorySurface, Items, Masonry, MasonryOptions, MasonrySettings, RenderSurface, Target,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

const CONTAINER_ID: &str = "masonry";

#[derive(Parser)]
#[command(name = "flex-masonry", version, about = "Lay out blocks into masonry columns")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lay out a scene file and print the resulting columns.
    Layout {
        scene: PathBuf,
        /// Override the container width from the scene.
        #[arg(long)]
        width: Option<f64>,
        #[arg(long, value_enum, default_value_t = Format::Tree)]
        format: Format,
        /// Heights appended one by one after the initial layout.
        #[arg(long, value_delimiter = ',')]
        append: Vec<f64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Tree,
    Json,
}

#[derive(Deserialize)]
struct Scene {
    container_width: f64,
    #[serde(default)]
    items: Vec<f64>,
    settings: MasonrySettings,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Layout { scene, width, format, append } => {
            let source = fs::read_to_string(&scene)
                .with_context(|| format!("reading scene {}", scene.display()))?;
            let scene: Scene = toml::from_str(&source).context("parsing scene")?;
            let output = layout(scene, width, &append, format)?;
            println!("{output}");
        }
    }
    Ok(())
}

fn layout(scene: Scene, width: Option<f64>, append: &[f64], format: Format) -> anyhow::Result<String> {
    let column_width = scene.settings.column_width;
    let mut surface = InMemorySurface::new();
    let root = surface.root();
    let container = surface.add_block(
        root,
        "div",
        &[("id", CONTAINER_ID)],
        width.unwrap_or(scene.container_width),
        0.0,
    );
    let items = scene
        .items
        .iter()
        .map(|&height| surface.add_block(container, "div", &[("class", "item")], column_width, height))
        .collect();

    let options = MasonryOptions::with_settings(
        Target::ByLookup(format!("#{CONTAINER_ID}")),
        Items::ByHandle(items),
        scene.settings,
    );
    let mut masonry = Masonry::new(surface, options)?;
    if !masonry.settings().auto_exec {
        masonry.exec()?;
    }

    let extra: Vec<_> = append
        .iter()
        .map(|&height| {
            let node = masonry.surface_mut().create_container_node("div", &[("class", "item")]);
            masonry.surface_mut().set_size(node, column_width, height);
            node
        })
        .collect();
    masonry.append_elements(extra)?;

    Ok(match format {
        Format::Tree => masonry.draw_tree(),
        Format::Json => serde_json::to_string_pretty(&masonry.snapshot())?,
    })
}

#[cfg(test)]
mod tests {
    use flex_masonry::{LayoutSnapshot, Phase};
    use pretty_assertions::assert_eq;

    use super::*;

    const SCENE: &str = r#"
        container_width = 320.0
        items = [50.0, 40.0, 30.0]

        [settings]
        column_width = 100.0
    "#;

    fn scene(source: &str) -> Scene { toml::from_str(source).unwrap() }

    fn snapshot(width: Option<f64>, append: &[f64]) -> LayoutSnapshot {
        let json = layout(scene(SCENE), width, append, Format::Json).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    fn placed(snapshot: &LayoutSnapshot) -> Vec<Vec<usize>> {
        snapshot
            .columns
            .iter()
            .map(|column| column.items.iter().map(|item| item.index).collect())
            .collect()
    }

    #[test]
    fn lays_out_scene_at_its_own_width() {
        let snapshot = snapshot(None, &[]);
        assert_eq!(snapshot.phase, Phase::Committed);
        assert_eq!(snapshot.item_count, 3);
        assert_eq!(placed(&snapshot), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn width_override_and_appends() {
        let snapshot = snapshot(Some(220.0), &[5.0]);
        assert_eq!(snapshot.item_count, 4);
        assert_eq!(placed(&snapshot), vec![vec![0, 3], vec![1, 2]]);
        let heights: Vec<f64> = snapshot.columns.iter().map(|column| column.height).collect();
        assert_eq!(heights, vec![55.0, 70.0]);
    }

    #[test]
    fn manual_exec_scene_renders_tree() {
        let scene = scene(
            r#"
            container_width = 100.0
            items = [10.0]

            [settings]
            column_width = 100.0
            auto_exec = false
            "#,
        );
        let tree = layout(scene, None, &[20.0], Format::Tree).unwrap();
        assert!(tree.contains("masonry (Committed, 1 columns, 2 items)"), "{tree}");
        assert!(tree.contains("item 1 [h=20]"), "{tree}");
    }
}
