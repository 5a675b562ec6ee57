//! Safetensors persistence for epoch tables.
//!
//! Layout of one output file:
//!
//! ```text
//! <Fp1>   F32 [E, T]     one tensor per channel, named after it
//!  …
//! label   U8  [E]
//! __metadata__ { subject, channels (comma-joined column order), sfreq }
//! ```
use anyhow::{bail, Context, Result};
use ndarray::{Array2, Array3, Axis};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::table::EpochTable;

/// Name of the label tensor.
pub const LABEL_KEY: &str = "label";

// ── Low-level safetensors parser ──────────────────────────────────────────────

fn parse_header(bytes: &[u8]) -> Result<(HashMap<String, serde_json::Value>, usize)> {
    let Some(len) = bytes.get(..8) else {
        bail!("safetensors file too small");
    };
    let mut n = [0u8; 8];
    n.copy_from_slice(len);
    let n = u64::from_le_bytes(n) as usize;
    let body = bytes
        .get(8..8 + n)
        .context("safetensors header runs past end of file")?;
    let header: HashMap<String, serde_json::Value> =
        serde_json::from_slice(body).context("failed to parse safetensors header")?;
    Ok((header, 8 + n))
}

fn tensor_bytes<'a>(
    bytes: &'a [u8],
    data_start: usize,
    name: &str,
    entry: &serde_json::Value,
    dtype: &str,
) -> Result<&'a [u8]> {
    if entry["dtype"].as_str() != Some(dtype) {
        bail!("tensor {name}: expected dtype {dtype}, found {}", entry["dtype"]);
    }
    let offsets = entry["data_offsets"]
        .as_array()
        .with_context(|| format!("tensor {name}: missing data_offsets"))?;
    let (Some(s), Some(e)) = (
        offsets.first().and_then(|v| v.as_u64()),
        offsets.get(1).and_then(|v| v.as_u64()),
    ) else {
        bail!("tensor {name}: malformed data_offsets");
    };
    bytes
        .get(data_start + s as usize..data_start + e as usize)
        .with_context(|| format!("tensor {name}: data runs past end of file"))
}

fn shape_of(name: &str, entry: &serde_json::Value) -> Result<Vec<usize>> {
    entry["shape"]
        .as_array()
        .with_context(|| format!("tensor {name}: missing shape"))?
        .iter()
        .map(|v| {
            v.as_u64()
                .map(|d| d as usize)
                .with_context(|| format!("tensor {name}: bad dimension {v}"))
        })
        .collect()
}

fn meta_str<'a>(meta: &'a serde_json::Map<String, serde_json::Value>, key: &str) -> Result<&'a str> {
    meta.get(key)
        .and_then(|v| v.as_str())
        .with_context(|| format!("metadata key {key:?} missing"))
}

// ── Generic safetensors builder ───────────────────────────────────────────────

/// Simple safetensors file writer for F32 and U8 tensors plus string
/// metadata.
///
/// Usage:
/// ```rust,no_run
/// use seizure_prep::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f32("signal", &[1.0f32, 2.0, 3.0], &[1, 3]);
/// w.add_u8("label", &[0, 1, 1], &[3]);
/// w.metadata("subject", "patient01");
/// w.write(Path::new("/tmp/out.safetensors")).unwrap();
/// ```
#[derive(Default)]
pub struct StWriter {
    entries: Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
    metadata: serde_json::Map<String, serde_json::Value>,
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_f32(&mut self, name: &str, data: &[f32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F32", shape.to_vec()));
    }

    pub fn add_f32_arr2(&mut self, name: &str, arr: &Array2<f32>) {
        let data: Vec<f32> = arr.iter().copied().collect();
        self.add_f32(name, &data, &[arr.nrows(), arr.ncols()]);
    }

    pub fn add_u8(&mut self, name: &str, data: &[u8], shape: &[usize]) {
        self.entries.push((name.to_string(), data.to_vec(), "U8", shape.to_vec()));
    }

    pub fn metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.into());
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut header_map = serde_json::Map::new();
        if !self.metadata.is_empty() {
            header_map.insert("__metadata__".into(), self.metadata.clone().into());
        }
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(name.clone(), serde_json::json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }));
            offset += data.len();
        }
        let hdr_bytes = serde_json::to_vec(&header_map)?;
        let pad = (8 - hdr_bytes.len() % 8) % 8;
        let padded: Vec<u8> = hdr_bytes.into_iter()
            .chain(std::iter::repeat(b' ').take(pad))
            .collect();
        let f = std::fs::File::create(path)
            .with_context(|| format!("create {}", path.display()))?;
        let mut f = std::io::BufWriter::new(f);
        f.write_all(&(padded.len() as u64).to_le_bytes())?;
        f.write_all(&padded)?;
        for (_, data, _, _) in &self.entries {
            f.write_all(data)?;
        }
        f.flush()?;
        Ok(())
    }
}

// ── Epoch tables ──────────────────────────────────────────────────────────────

/// Output file for `input`: its stem plus `suffix`, inside `out_dir`.
///
/// `data/patient01.edf` with suffix `_epochs.safetensors` becomes
/// `out_dir/patient01_epochs.safetensors`.
pub fn output_path(input: &Path, out_dir: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out_dir.join(format!("{stem}{suffix}"))
}

/// Write `table` to `path`.
///
/// Bytes go to a sibling `.part` file first, which is renamed over `path`
/// only once fully written.
pub fn write_epoch_table(table: &EpochTable, path: &Path) -> Result<()> {
    let mut w = StWriter::new();
    for (c, name) in table.ch_names.iter().enumerate() {
        w.add_f32_arr2(name, &table.column(c).to_owned());
    }
    w.add_u8(LABEL_KEY, &table.labels, &[table.n_epochs()]);
    w.metadata("subject", &table.subject);
    w.metadata("channels", &table.ch_names.join(","));
    w.metadata("sfreq", &table.sfreq.to_string());

    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);
    if let Err(e) = w.write(&part) {
        let _ = std::fs::remove_file(&part);
        return Err(e);
    }
    std::fs::rename(&part, path)
        .with_context(|| format!("rename {} → {}", part.display(), path.display()))?;
    Ok(())
}

/// Read a file written by [`write_epoch_table`].
pub fn read_epoch_table(path: &Path) -> Result<EpochTable> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let (header, data_start) = parse_header(&bytes)?;

    let meta = header
        .get("__metadata__")
        .and_then(|m| m.as_object())
        .context("missing __metadata__")?;
    let subject = meta_str(meta, "subject")?.to_string();
    let ch_names: Vec<String> = meta_str(meta, "channels")?
        .split(',')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    let sfreq: f32 = meta_str(meta, "sfreq")?.parse().context("metadata sfreq is not a number")?;

    let label_entry = header.get(LABEL_KEY).context("missing 'label' tensor")?;
    let labels = tensor_bytes(&bytes, data_start, LABEL_KEY, label_entry, "U8")?.to_vec();
    let n_e = labels.len();

    let mut columns = Vec::with_capacity(ch_names.len());
    let mut n_t = 0;
    for name in &ch_names {
        let entry = header
            .get(name)
            .with_context(|| format!("missing tensor for channel {name}"))?;
        let shape = shape_of(name, entry)?;
        let &[rows, cols] = shape.as_slice() else {
            bail!("channel {name}: expected a 2-D tensor, got shape {shape:?}");
        };
        if rows != n_e {
            bail!("channel {name}: {rows} rows but {n_e} labels");
        }
        n_t = cols;
        let raw = tensor_bytes(&bytes, data_start, name, entry, "F32")?;
        let values: Vec<f32> = raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        columns.push(Array2::from_shape_vec((rows, cols), values)?);
    }

    let mut data = Array3::<f32>::zeros((n_e, ch_names.len(), n_t));
    for (c, col) in columns.iter().enumerate() {
        if col.ncols() != n_t {
            bail!("channel {} has {} samples per epoch, expected {n_t}", ch_names[c], col.ncols());
        }
        data.index_axis_mut(Axis(1), c).assign(col);
    }

    Ok(EpochTable { subject, ch_names, sfreq, data, labels })
}
