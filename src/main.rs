use std::env;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use char_rnn::checkpoint::{flush_checkpoint, serialize_checkpoint};
use char_rnn::{train, Config, CorpusReader, Result, Rng, RnnModel, Vocab};

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut cfg = Config::default();
    let mut corpus_path = String::from("input.txt");

    // --key=value overrides; a bare argument is the corpus path
    for arg in env::args().skip(1) {
        if let Some(rest) = arg.strip_prefix("--") {
            let Some((key, value)) = rest.split_once('=') else {
                log::warn!("ignoring malformed flag {arg} (expected --key=value)");
                continue;
            };
            match key {
                "hidden" => cfg.hidden_size = value.parse().unwrap_or(cfg.hidden_size),
                "seq" => cfg.seq_length = value.parse().unwrap_or(cfg.seq_length),
                "lr" => cfg.learning_rate = value.parse().unwrap_or(cfg.learning_rate),
                "iters" => cfg.max_iters = value.parse().unwrap_or(cfg.max_iters),
                "sample-every" => {
                    cfg.sample_interval = value.parse().unwrap_or(cfg.sample_interval)
                }
                "sample-len" => cfg.sample_len = value.parse().unwrap_or(cfg.sample_len),
                "seed" => cfg.seed = value.parse().unwrap_or(cfg.seed),
                other => log::warn!("ignoring unknown flag --{other}"),
            }
        } else {
            corpus_path = arg;
        }
    }
    cfg.validate()?;

    let text = fs::read_to_string(&corpus_path)?;
    let vocab = Vocab::from_text(&text)?;
    let data = vocab.encode(&text);
    let mut reader = CorpusReader::new(data, vocab.size(), cfg.seq_length)?;

    let mut rng = Rng::new(cfg.seed);
    let mut model = RnnModel::new(cfg.hidden_size, vocab.size(), &mut rng);

    log::info!(
        "corpus {}: {} characters, {} unique",
        corpus_path,
        reader.data_size(),
        vocab.size()
    );
    log::info!(
        "model: {} hidden units, {} parameters | seq {} | lr {} | up to {} iterations",
        cfg.hidden_size,
        model.num_params(),
        cfg.seq_length,
        cfg.learning_rate,
        cfg.max_iters
    );

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        if let Err(e) = ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed)) {
            log::warn!("could not install ctrl-c handler: {e}");
        }
    }

    let state = train(&mut model, &mut reader, &vocab, &cfg, &mut rng, &stop)?;

    flush_checkpoint(
        "checkpoint.bin",
        &serialize_checkpoint(&model, state.iter, state.smooth_loss),
    )?;
    vocab.save("vocab.json")?;
    log::info!(
        "stopped after {} iterations | smooth loss {:.4} | best {:.4} @{} | wrote checkpoint.bin + vocab.json",
        state.iter,
        state.smooth_loss,
        state.best_loss,
        state.best_iter
    );

    Ok(())
}
