//! # Integration Tests
//!
//! End-to-end tests running real child processes through the orchestrator.
//!
//! Covers:
//! - The build → render → convert → cleanup scenarios
//! - Spawn failures, timeouts and interruption
//! - Configuration files driving a real run

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_default_blueprint_is_valid() {
        let blueprint = contracts::PipelineBlueprint::render_default();
        config_loader::ConfigLoader::validate(&blueprint).unwrap();
    }
}

#[cfg(all(test, unix))]
mod e2e_tests {
    use std::path::Path;
    use std::time::{Duration, Instant};

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{PipelineBlueprint, StageConfig, StagePhase, StageStatus};
    use orchestrator::{shutdown, Orchestrator, ProcessExecutor, RunReport};
    use tempfile::TempDir;

    fn sh(name: &str, script: &str) -> StageConfig {
        StageConfig::new(name, "sh").with_args(["-c", script])
    }

    /// Stand-in for the raytracer pipeline: "render" prints a tiny PPM to stdout,
    /// "convert" copies it to the final image, cleanup removes the intermediate.
    fn render_pipeline(
        build: &str,
        convert: &str,
        cleanup: &str,
    ) -> (Vec<StageConfig>, StageConfig) {
        let stages = vec![
            sh("build", build),
            sh("render", "printf 'P3\\n1 1\\n255\\n0 0 0\\n'").with_stdout("image.ppm"),
            sh("convert", convert),
        ];
        (stages, sh("cleanup", cleanup))
    }

    async fn run_in(dir: &Path, stages: &[StageConfig], cleanup: &StageConfig) -> RunReport {
        let executor = ProcessExecutor::new().with_working_dir(dir);
        Orchestrator::new(executor).run(stages, cleanup).await
    }

    fn executed(report: &RunReport) -> Vec<&str> {
        report.stages.iter().map(|s| s.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_full_success_removes_intermediate() {
        let dir = TempDir::new().unwrap();
        let (stages, cleanup) = render_pipeline("true", "cp image.ppm image.png", "rm image.ppm");

        let report = run_in(dir.path(), &stages, &cleanup).await;

        assert_eq!(report.exit_code(), 0);
        assert_eq!(executed(&report), vec!["build", "render", "convert", "cleanup"]);
        assert!(!dir.path().join("image.ppm").exists());
        let final_image = std::fs::read_to_string(dir.path().join("image.png")).unwrap();
        assert!(final_image.starts_with("P3"));
    }

    #[tokio::test]
    async fn test_build_failure_stops_everything() {
        let dir = TempDir::new().unwrap();
        let (stages, cleanup) = render_pipeline("exit 1", "cp image.ppm image.png", "rm image.ppm");

        let report = run_in(dir.path(), &stages, &cleanup).await;

        assert_eq!(report.exit_code(), 1);
        assert_eq!(executed(&report), vec!["build"]);
        assert!(!report.cleanup_ran());
        assert!(!dir.path().join("image.ppm").exists());
        assert!(!dir.path().join("image.png").exists());
    }

    #[tokio::test]
    async fn test_convert_failure_keeps_intermediate() {
        let dir = TempDir::new().unwrap();
        let (stages, cleanup) = render_pipeline("true", "exit 2", "rm image.ppm");

        let report = run_in(dir.path(), &stages, &cleanup).await;

        assert_eq!(report.exit_code(), 2);
        assert_eq!(executed(&report), vec!["build", "render", "convert"]);
        let intermediate = std::fs::metadata(dir.path().join("image.ppm")).unwrap();
        assert!(intermediate.len() > 0);
    }

    #[tokio::test]
    async fn test_cleanup_failure_sets_exit_code() {
        let dir = TempDir::new().unwrap();
        let (stages, cleanup) = render_pipeline("true", "cp image.ppm image.png", "exit 5");

        let report = run_in(dir.path(), &stages, &cleanup).await;

        assert_eq!(report.exit_code(), 5);
        assert!(report.cleanup_ran());
        assert_eq!(
            report.stage("cleanup").map(|s| s.phase),
            Some(StagePhase::Cleanup)
        );
        assert!(dir.path().join("image.png").exists());
    }

    #[tokio::test]
    async fn test_empty_stage_list_runs_cleanup() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("stale.ppm"), "x").unwrap();

        let report = run_in(dir.path(), &[], &sh("cleanup", "rm stale.ppm")).await;

        assert_eq!(report.exit_code(), 0);
        assert_eq!(executed(&report), vec!["cleanup"]);
        assert!(!dir.path().join("stale.ppm").exists());
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_failure() {
        let dir = TempDir::new().unwrap();
        let stages = vec![
            StageConfig::new("build", "renderchain-definitely-missing-tool"),
            sh("render", "touch rendered"),
        ];

        let report = run_in(dir.path(), &stages, &sh("cleanup", "touch cleaned")).await;

        assert_eq!(report.exit_code(), 127);
        assert!(matches!(
            report.stages[0].status,
            StageStatus::SpawnFailed { .. }
        ));
        assert!(!dir.path().join("rendered").exists());
        assert!(!dir.path().join("cleaned").exists());
    }

    #[tokio::test]
    async fn test_timeout_kills_stage() {
        let dir = TempDir::new().unwrap();
        let stages = vec![StageConfig::new("render", "sleep")
            .with_args(["10"])
            .with_timeout_secs(1)];

        let started = Instant::now();
        let report = run_in(dir.path(), &stages, &sh("cleanup", "touch cleaned")).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(report.exit_code(), 124);
        assert_eq!(
            report.stages[0].status,
            StageStatus::TimedOut { after_secs: 1 }
        );
        assert!(!dir.path().join("cleaned").exists());
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_running_stage() {
        let dir = TempDir::new().unwrap();
        let (trigger, listener) = shutdown::channel();
        let stages = vec![
            StageConfig::new("render", "sleep").with_args(["30"]),
            sh("convert", "touch converted"),
        ];
        let cleanup = sh("cleanup", "touch cleaned");

        let executor = ProcessExecutor::new()
            .with_working_dir(dir.path())
            .with_shutdown(listener);
        let mut orchestrator = Orchestrator::new(executor);

        let started = Instant::now();
        let (report, ()) = tokio::join!(orchestrator.run(&stages, &cleanup), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.trigger();
        });

        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(report.exit_code(), 130);
        assert_eq!(executed(&report), vec!["render"]);
        assert!(!dir.path().join("converted").exists());
        assert!(!dir.path().join("cleaned").exists());
    }

    #[tokio::test]
    async fn test_repeated_runs_are_idempotent() {
        let dir = TempDir::new().unwrap();
        let (stages, cleanup) = render_pipeline("true", "cp image.ppm image.png", "rm image.ppm");

        let mut images = Vec::new();
        for _ in 0..2 {
            let report = run_in(dir.path(), &stages, &cleanup).await;
            assert_eq!(report.exit_code(), 0);
            assert!(!dir.path().join("image.ppm").exists());
            images.push(std::fs::read(dir.path().join("image.png")).unwrap());
        }

        assert_eq!(images[0], images[1]);
    }

    #[tokio::test]
    async fn test_relative_working_dir_runs_relative_program() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new_in(".").unwrap();
        let script = dir.path().join("render.sh");
        std::fs::write(&script, "#!/bin/sh\necho pixels\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let relative = dir.path().file_name().unwrap();
        let stages = vec![StageConfig::new("render", "./render.sh").with_stdout("image.ppm")];
        let report = run_in(Path::new(relative), &stages, &sh("cleanup", "true")).await;

        assert_eq!(report.exit_code(), 0, "got: {:?}", report.stages);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("image.ppm")).unwrap(),
            "pixels\n"
        );
    }

    #[tokio::test]
    async fn test_stdout_is_truncated_between_runs() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("out.txt"), "stale content that is long").unwrap();
        let stages = vec![sh("render", "echo fresh").with_stdout("out.txt")];

        for _ in 0..2 {
            let report = run_in(dir.path(), &stages, &sh("cleanup", "true")).await;
            assert_eq!(report.exit_code(), 0);
        }

        let content = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert_eq!(content, "fresh\n");
    }

    #[tokio::test]
    async fn test_stage_env_is_passed() {
        let dir = TempDir::new().unwrap();
        let stages = vec![sh("render", "printf %s \"$RENDER_SAMPLES\"")
            .with_env("RENDER_SAMPLES", "64")
            .with_stdout("samples.txt")];

        let report = run_in(dir.path(), &stages, &sh("cleanup", "true")).await;

        assert_eq!(report.exit_code(), 0);
        let content = std::fs::read_to_string(dir.path().join("samples.txt")).unwrap();
        assert_eq!(content, "64");
    }

    #[tokio::test]
    async fn test_blueprint_from_toml_drives_run() {
        let dir = TempDir::new().unwrap();
        let toml = format!(
            r#"
[pipeline]
name = "from-config"
working_dir = "{}"

[[stages]]
name = "render"
program = "sh"
args = ["-c", "echo pixels"]
stdout = "image.ppm"

[[stages]]
name = "convert"
program = "cp"
args = ["image.ppm", "image.png"]

[cleanup]
name = "cleanup"
program = "rm"
args = ["image.ppm"]

[artifacts]
intermediate = "image.ppm"
final_output = "image.png"
"#,
            dir.path().display()
        );

        let blueprint: PipelineBlueprint =
            ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        let working_dir = blueprint.pipeline.working_dir.clone().unwrap();
        let executor = ProcessExecutor::new().with_working_dir(working_dir);
        let report = Orchestrator::new(executor).run_blueprint(&blueprint).await;

        assert_eq!(report.exit_code(), 0);
        assert_eq!(executed(&report), vec!["render", "convert", "cleanup"]);
        assert!(!dir.path().join("image.ppm").exists());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("image.png")).unwrap(),
            "pixels\n"
        );
    }
}
