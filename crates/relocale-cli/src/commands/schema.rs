use std::fs;
use std::path::PathBuf;

pub fn run_schema(out_dir: PathBuf) -> color_eyre::Result<()> {
    tracing::debug!(event = "schema_args", out_dir = ?out_dir);
    fs::create_dir_all(&out_dir)?;
    macro_rules! dump {
        ($ty:ty, $name:literal) => {{
            let schema = schemars::schema_for!($ty);
            let path = out_dir.join($name);
            let f = std::fs::File::create(&path)?;
            serde_json::to_writer_pretty(f, &schema)?;
        }};
    }
    dump!(relocale_domain::LocaleStatus, "locale_status.schema.json");
    dump!(relocale_domain::DiffReport, "diff_report.schema.json");
    dump!(relocale_domain::RunSummary, "run_summary.schema.json");
    dump!(relocale_domain::ArtifactReport, "artifact_report.schema.json");
    dump!(relocale_domain::DirOpReport, "dir_op_report.schema.json");
    crate::ui_ok!("schemas written to {}", out_dir.display());
    Ok(())
}
