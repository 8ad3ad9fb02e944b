//! Command-line front end for the GeneLens prediction session.

use std::path::PathBuf;

use genelens::classifier_api::{ClassifierApi, PredictionClient, PredictionResult};
use genelens::config::{self, ClientConfig};
use genelens::logging;
use genelens::sequence_sanitize;
use genelens::session::PredictionSession;

fn main() {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

enum Command {
    Health,
    Train { file: Option<String> },
    Predict { raw: String },
    Batch { raws: Vec<String> },
}

struct Options {
    command: Command,
    endpoint: Option<String>,
    api_key: Option<String>,
    config_path: Option<PathBuf>,
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    let config = load_config(&options)?;
    let client = PredictionClient::new(&config);

    match options.command {
        Command::Batch { raws } => run_batch(&client, &raws),
        Command::Health => run_health(PredictionSession::new(client)),
        Command::Train { file } => run_train(PredictionSession::new(client), file.as_deref()),
        Command::Predict { raw } => run_predict(PredictionSession::new(client), &raw),
    }
}

fn run_health(mut session: PredictionSession<PredictionClient>) -> Result<(), String> {
    session.initialize();
    let state = session.state();
    if let Some(status) = &state.training_status {
        println!(
            "Model trained: {}",
            if status.is_trained { "yes" } else { "no" }
        );
        if let Some(accuracy) = status.accuracy {
            println!("Accuracy: {:.1}%", accuracy * 100.0);
        }
        if let Some(size) = status.dataset_size {
            println!("Dataset size: {size}");
        }
    }
    match &state.error_message {
        Some(message) => Err(message.clone()),
        None => Ok(()),
    }
}

fn run_train(
    mut session: PredictionSession<PredictionClient>,
    file: Option<&str>,
) -> Result<(), String> {
    session.train(file);
    match &session.state().error_message {
        Some(message) => Err(message.clone()),
        None => {
            println!("Training complete; model is ready.");
            Ok(())
        }
    }
}

fn run_predict(
    mut session: PredictionSession<PredictionClient>,
    raw: &str,
) -> Result<(), String> {
    session.predict_sequence(raw);
    let state = session.state();
    if let Some(message) = &state.error_message {
        return Err(message.clone());
    }
    let result = state
        .last_prediction
        .as_ref()
        .ok_or_else(|| "No prediction was produced".to_string())?;
    print_result(result);
    Ok(())
}

fn run_batch(client: &PredictionClient, raws: &[String]) -> Result<(), String> {
    let mut sequences = Vec::with_capacity(raws.len());
    for (index, raw) in raws.iter().enumerate() {
        let sequence = sequence_sanitize::clean(raw)
            .map_err(|err| format!("Sequence {}: {err}", index + 1))?;
        sequences.push(sequence);
    }
    let results = client
        .batch_predict(&sequences)
        .map_err(|err| err.to_string())?;
    for result in &results {
        print_result(result);
    }
    Ok(())
}

fn print_result(result: &PredictionResult) {
    println!(
        "{}  {}  confidence {:.1}% (coding {:.3}, non-coding {:.3})",
        result.sequence,
        result.label.as_str(),
        result.confidence * 100.0,
        result.coding_probability,
        result.non_coding_probability,
    );
}

fn load_config(options: &Options) -> Result<ClientConfig, String> {
    let mut config = match &options.config_path {
        Some(path) => config::load_from(path),
        None => config::load_or_default(),
    }
    .map_err(|err| err.to_string())?;
    if let Some(endpoint) = &options.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(api_key) = &options.api_key {
        config.api_key = Some(api_key.clone());
    }
    Ok(config.normalized())
}

fn parse_args(args: Vec<String>) -> Result<Option<Options>, String> {
    if args.is_empty() || args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(None);
    }

    let mut endpoint = None;
    let mut api_key = None;
    let mut config_path = None;
    let mut command = None;
    let mut positionals = Vec::new();
    let mut train_file = None;

    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--endpoint" => {
                endpoint = Some(
                    it.next()
                        .ok_or_else(|| "Missing value for --endpoint".to_string())?,
                );
            }
            "--api-key" => {
                api_key = Some(
                    it.next()
                        .ok_or_else(|| "Missing value for --api-key".to_string())?,
                );
            }
            "--config" => {
                let value = it
                    .next()
                    .ok_or_else(|| "Missing value for --config".to_string())?;
                config_path = Some(PathBuf::from(value));
            }
            "--file" => {
                train_file = Some(
                    it.next()
                        .ok_or_else(|| "Missing value for --file".to_string())?,
                );
            }
            "health" | "train" | "predict" | "batch" if command.is_none() => {
                command = Some(arg);
            }
            _ if command.is_some() && !arg.starts_with('-') => positionals.push(arg),
            _ => return Err(format!("Unknown argument: {arg}")),
        }
    }

    let command = match command.as_deref() {
        Some("health") => Command::Health,
        Some("train") => Command::Train { file: train_file },
        Some("predict") => {
            let raw = positionals
                .first()
                .cloned()
                .ok_or_else(|| "predict requires a sequence argument".to_string())?;
            Command::Predict { raw }
        }
        Some("batch") => {
            if positionals.is_empty() {
                return Err("batch requires at least one sequence argument".to_string());
            }
            Command::Batch { raws: positionals }
        }
        _ => return Err("No command given; see --help".to_string()),
    };

    Ok(Some(Options {
        command,
        endpoint,
        api_key,
        config_path,
    }))
}

fn print_help() {
    println!(
        "genelens - client for a remote coding/non-coding DNA classifier

Usage:
  genelens [OPTIONS] health
  genelens [OPTIONS] train [--file PATH]
  genelens [OPTIONS] predict SEQUENCE
  genelens [OPTIONS] batch SEQUENCE...

Options:
  --endpoint URL   Override the configured service endpoint
  --api-key KEY    Override the configured API key
  --config PATH    Load configuration from PATH instead of the default
  -h, --help       Show this help"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn each_command_parses_to_its_own_variant() {
        let options = parse_args(args(&["health"])).unwrap().unwrap();
        assert!(matches!(options.command, Command::Health));

        let options = parse_args(args(&["train", "--file", "human_data.txt"]))
            .unwrap()
            .unwrap();
        match options.command {
            Command::Train { file } => assert_eq!(file.as_deref(), Some("human_data.txt")),
            other => panic!("expected Train, got a different command: {}", name_of(&other)),
        }

        let options = parse_args(args(&["predict", "ATGCGT"])).unwrap().unwrap();
        assert!(matches!(options.command, Command::Predict { ref raw } if raw == "ATGCGT"));

        let options = parse_args(args(&["batch", "ATGCGT", "GGGCCC"]))
            .unwrap()
            .unwrap();
        assert!(matches!(options.command, Command::Batch { ref raws } if raws.len() == 2));
    }

    #[test]
    fn overrides_are_captured_alongside_the_command() {
        let options = parse_args(args(&[
            "--endpoint",
            "http://example.org",
            "--api-key",
            "secret",
            "health",
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(options.endpoint.as_deref(), Some("http://example.org"));
        assert_eq!(options.api_key.as_deref(), Some("secret"));
        assert!(matches!(options.command, Command::Health));
    }

    #[test]
    fn missing_arguments_are_rejected() {
        assert!(parse_args(args(&["predict"])).is_err());
        assert!(parse_args(args(&["batch"])).is_err());
        assert!(parse_args(args(&["--endpoint"])).is_err());
        assert!(parse_args(args(&["frobnicate"])).is_err());
    }

    #[test]
    fn help_short_circuits_without_a_command() {
        assert!(parse_args(args(&["--help"])).unwrap().is_none());
        assert!(parse_args(Vec::new()).unwrap().is_none());
    }

    fn name_of(command: &Command) -> &'static str {
        match command {
            Command::Health => "health",
            Command::Train { .. } => "train",
            Command::Predict { .. } => "predict",
            Command::Batch { .. } => "batch",
        }
    }
}
