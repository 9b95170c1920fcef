/* ------------------------------------------------------------------ */
/* Checkpoint save / load                                             */
/* ------------------------------------------------------------------ */
//
// File format (little-endian):
//   [0..8]   magic       b"CRNN0001"
//   [8..12]  vocab_size  u32
//   [12..16] hidden_size u32
//   [16..20] iter        u32   (last completed iteration, 0-based)
//   [20..28] smooth_loss f64
//   [28..]   flat f64 arrays:
//              wxh, whh, why, bh, by,
//              m_wxh, m_whh, m_why, m_bh, m_by
//
// The vocabulary is persisted separately as JSON (vocab.rs); a
// checkpoint is only valid together with the vocabulary it was
// trained against, which the vocab_size field guards.

use std::fs::File;
use std::io::{Read, Write};

use crate::model::RnnModel;

const MAGIC: &[u8; 8] = b"CRNN0001";

// ── In-memory helpers ──────────────────────────────────────────────

fn write_f64s(buf: &mut Vec<u8>, s: &[f64]) {
    buf.reserve(s.len() * 8);
    for &v in s {
        buf.extend_from_slice(&v.to_le_bytes());
    }
}

fn read_f64_slice(f: &mut File, n: usize) -> std::io::Result<Vec<f64>> {
    let mut raw = vec![0u8; n * 8];
    f.read_exact(&mut raw)?;
    Ok(raw
        .chunks_exact(8)
        .map(|b| {
            f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        })
        .collect())
}

// ── Public API ─────────────────────────────────────────────────────

/// Serialize parameters + AdaGrad accumulators + run metadata to an
/// in-memory byte buffer. No disk I/O — call flush_checkpoint() for that.
pub fn serialize_checkpoint(model: &RnnModel, iter: usize, smooth_loss: f64) -> Vec<u8> {
    let n_params = model.num_params();
    let mut buf: Vec<u8> = Vec::with_capacity(28 + n_params * 8 * 2);

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&(model.vocab_size as u32).to_le_bytes());
    buf.extend_from_slice(&(model.hidden_size as u32).to_le_bytes());
    buf.extend_from_slice(&(iter as u32).to_le_bytes());
    buf.extend_from_slice(&smooth_loss.to_le_bytes());

    write_f64s(&mut buf, &model.wxh);
    write_f64s(&mut buf, &model.whh);
    write_f64s(&mut buf, &model.why);
    write_f64s(&mut buf, &model.bh);
    write_f64s(&mut buf, &model.by);

    write_f64s(&mut buf, &model.m_wxh);
    write_f64s(&mut buf, &model.m_whh);
    write_f64s(&mut buf, &model.m_why);
    write_f64s(&mut buf, &model.m_bh);
    write_f64s(&mut buf, &model.m_by);

    buf
}

/// Atomically flush a checkpoint buffer to disk (write .tmp, rename).
pub fn flush_checkpoint(path: &str, buf: &[u8]) -> std::io::Result<()> {
    let tmp = format!("{}.tmp", path);
    {
        let mut f = File::create(&tmp)?;
        f.write_all(buf)?;
        f.flush()?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Load a checkpoint from disk into `model`, which must already have
/// the matching shapes. Returns (iter, smooth_loss).
pub fn load_checkpoint(path: &str, model: &mut RnnModel) -> std::io::Result<(usize, f64)> {
    let mut f = File::open(path)?;

    let mut magic = [0u8; 8];
    f.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("bad magic bytes in checkpoint {}", path),
        ));
    }

    let mut u32buf = [0u8; 4];
    f.read_exact(&mut u32buf)?;
    let ckpt_vocab = u32::from_le_bytes(u32buf) as usize;
    f.read_exact(&mut u32buf)?;
    let ckpt_hidden = u32::from_le_bytes(u32buf) as usize;
    f.read_exact(&mut u32buf)?;
    let iter = u32::from_le_bytes(u32buf) as usize;
    let mut f64buf = [0u8; 8];
    f.read_exact(&mut f64buf)?;
    let smooth_loss = f64::from_le_bytes(f64buf);

    if ckpt_vocab != model.vocab_size || ckpt_hidden != model.hidden_size {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "checkpoint shape {}x{} != model shape {}x{}",
                ckpt_hidden, ckpt_vocab, model.hidden_size, model.vocab_size
            ),
        ));
    }

    model.wxh = read_f64_slice(&mut f, model.wxh.len())?;
    model.whh = read_f64_slice(&mut f, model.whh.len())?;
    model.why = read_f64_slice(&mut f, model.why.len())?;
    model.bh = read_f64_slice(&mut f, model.bh.len())?;
    model.by = read_f64_slice(&mut f, model.by.len())?;

    model.m_wxh = read_f64_slice(&mut f, model.m_wxh.len())?;
    model.m_whh = read_f64_slice(&mut f, model.m_whh.len())?;
    model.m_why = read_f64_slice(&mut f, model.m_why.len())?;
    model.m_bh = read_f64_slice(&mut f, model.m_bh.len())?;
    model.m_by = read_f64_slice(&mut f, model.m_by.len())?;

    Ok((iter, smooth_loss))
}
