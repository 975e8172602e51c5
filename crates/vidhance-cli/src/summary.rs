use std::time::Duration;

use console::Style;
use vidhance_core::pipeline::config::{EqualizeMode, ExportConfig};
use vidhance_core::pipeline::{ExportReport, VideoStatus};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
    ok: Style,
    failed: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            ok: Style::new().green(),
            failed: Style::new().red().bold(),
        }
    }
}

pub fn print_export_summary(config: &ExportConfig) {
    let s = Styles::new();
    let spec = &config.enhancement;

    println!();
    println!("  {}", s.title.apply_to("Vidhance Export"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(15)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Videos"),
        s.value.apply_to(config.inputs.len())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output_dir.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(&config.crop)
    );
    println!();

    println!("  {}", s.header.apply_to("Enhancement"));
    if spec.gamma_enabled {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Gamma"),
            s.value.apply_to(spec.gamma)
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Gamma"),
            s.disabled.apply_to("disabled")
        );
    }

    match spec.equalize {
        EqualizeMode::None => println!(
            "    {:<12}{}",
            s.label.apply_to("Equalize"),
            s.disabled.apply_to("disabled")
        ),
        EqualizeMode::Global => println!(
            "    {:<12}{}",
            s.label.apply_to("Equalize"),
            s.method.apply_to(spec.equalize)
        ),
        EqualizeMode::Adaptive => {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Equalize"),
                s.method.apply_to(spec.equalize)
            );
            println!(
                "    {:<12}{}",
                s.label.apply_to("Clip"),
                s.value.apply_to(spec.clahe.clip_limit)
            );
            println!(
                "    {:<12}{}",
                s.label.apply_to("Tiles"),
                s.value
                    .apply_to(format!("{}x{}", spec.clahe.tiles_x, spec.clahe.tiles_y))
            );
        }
    }

    println!(
        "    {:<12}{}",
        s.label.apply_to("Edges"),
        if spec.edges_enabled {
            s.method.apply_to("Canny")
        } else {
            s.disabled.apply_to("disabled")
        }
    );
    println!();
}

pub fn print_export_report(report: &ExportReport, elapsed: Duration) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Results"));
    for video in &report.videos {
        let name = video
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| video.input.display().to_string());
        let status = match &video.status {
            VideoStatus::Written { .. } => s.ok.apply_to(video.status.to_string()),
            VideoStatus::Failed { .. } => s.failed.apply_to(video.status.to_string()),
            _ => s.disabled.apply_to(video.status.to_string()),
        };
        println!("    {:<24}{}", s.label.apply_to(name), status);
    }
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Elapsed"),
        s.value.apply_to(format!("{:.1}s", elapsed.as_secs_f64()))
    );
}
