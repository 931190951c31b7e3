// src/lexer/tables/io.rs
use std::{
    collections::BTreeMap,
    io::{BufWriter, Write},
    time::Instant,
};

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use super::{LexerTables, expr::Range, tokens::INVALID_STATE};

// -------------------- JSON (de)serialization --------------------

#[serde_as]
#[derive(Serialize, Deserialize)]
struct LexerTablesDisk {
    alphabet: Vec<Range>,
    n_states: u32,
    n_symbols: u32,
    start: u32,
    next: Vec<u32>,
    #[serde_as(as = "Vec<(_, _)>")]
    accept: BTreeMap<u32, u32>,
    token_names: Vec<String>,
}
impl From<&LexerTables> for LexerTablesDisk {
    fn from(t: &LexerTables) -> Self {
        Self {
            alphabet: t.alphabet.clone(),
            n_states: t.n_states,
            n_symbols: t.n_symbols,
            start: t.start,
            next: t.next.clone(),
            accept: t.accept.clone(),
            token_names: t.token_names.clone(),
        }
    }
}
impl LexerTablesDisk {
    fn into_tables(self) -> Result<LexerTables, String> {
        let expected = self.n_states as usize * self.n_symbols as usize;
        if self.next.len() != expected {
            return Err(format!(
                "next table has {} entries, expected {expected}",
                self.next.len()
            ));
        }
        if self.alphabet.len() != self.n_symbols as usize {
            return Err("alphabet length does not match n_symbols".into());
        }
        Ok(LexerTables {
            alphabet: self.alphabet,
            n_states: self.n_states,
            n_symbols: self.n_symbols,
            start: self.start,
            next: self.next,
            accept: self.accept,
            token_names: self.token_names,
        })
    }
}

pub fn save_tables_json(path: &std::path::Path, t: &LexerTables) -> std::io::Result<()> {
    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer(&mut w, &LexerTablesDisk::from(t))?;
    w.flush()
}

pub fn load_tables_json_bytes(data: &[u8]) -> Result<LexerTables, String> {
    serde_json::from_slice::<LexerTablesDisk>(data)
        .map_err(|e| format!("Failed to parse lexer tables JSON: {e}"))?
        .into_tables()
}

// -------------------- Compact binary (u16 state packing) --------------------
//   magic: 8 bytes = "TGLEX001"
//   u32: n_states, n_symbols, start, n_accept
//   u32 pairs: alphabet[n_symbols] (min, max)
//   u16: next[n_states * n_symbols]   // INVALID = 0xFFFF
//   u32 pairs: accept[n_accept] (state, token)
// Token names are not part of the binary form.

const BIN_MAGIC: &[u8; 8] = b"TGLEX001";
const INVALID_STATE_U16: u16 = 0xFFFF;

fn invalid(msg: impl Into<String>) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, msg.into())
}

pub fn save_tables_bin(path: &std::path::Path, t: &LexerTables) -> std::io::Result<()> {
    let instant = Instant::now();
    if t.n_states >= INVALID_STATE_U16 as u32 {
        return Err(invalid(format!(
            "n_states={} does not fit the u16 packing",
            t.n_states
        )));
    }

    let f = std::fs::File::create(path)?;
    let mut w = BufWriter::new(f);

    w.write_all(BIN_MAGIC)?;
    w.write_all(&t.n_states.to_le_bytes())?;
    w.write_all(&t.n_symbols.to_le_bytes())?;
    w.write_all(&t.start.to_le_bytes())?;
    w.write_all(&(t.accept.len() as u32).to_le_bytes())?;

    for r in &t.alphabet {
        w.write_all(&r.min.to_le_bytes())?;
        w.write_all(&r.max.to_le_bytes())?;
    }

    {
        let mut bytes = vec![0u8; t.next.len() * 2];
        for (i, &s) in t.next.iter().enumerate() {
            let v = if s == INVALID_STATE {
                INVALID_STATE_U16
            } else {
                u16::try_from(s).map_err(|_| invalid("next state > u16::MAX"))?
            };
            let p = i * 2;
            bytes[p..p + 2].copy_from_slice(&v.to_le_bytes());
        }
        w.write_all(&bytes)?;
    }

    for (&s, &tok) in &t.accept {
        w.write_all(&s.to_le_bytes())?;
        w.write_all(&tok.to_le_bytes())?;
    }

    let flush = w.flush();
    log::info!(
        "[tables] saved {} in {} ms",
        path.display(),
        instant.elapsed().as_millis()
    );
    flush
}

#[inline]
fn take_u32(buf: &mut &[u8]) -> Result<u32, String> {
    if buf.len() < 4 {
        return Err("truncated u32".into());
    }
    let mut le = [0u8; 4];
    le.copy_from_slice(&buf[..4]);
    *buf = &buf[4..];
    Ok(u32::from_le_bytes(le))
}

#[inline]
fn take_u16(buf: &mut &[u8]) -> Result<u16, String> {
    if buf.len() < 2 {
        return Err("truncated u16".into());
    }
    let mut le = [0u8; 2];
    le.copy_from_slice(&buf[..2]);
    *buf = &buf[2..];
    Ok(u16::from_le_bytes(le))
}

/// Loads the binary form; `token_names` comes back empty.
pub fn load_tables_bin_bytes(mut data: &[u8]) -> Result<LexerTables, String> {
    if data.len() < 8 + 4 * 4 {
        return Err("lexer tables bin too short".into());
    }
    if &data[..8] != BIN_MAGIC {
        return Err("bad magic in lexer tables .bin".into());
    }
    data = &data[8..];

    let n_states = take_u32(&mut data)?;
    let n_symbols = take_u32(&mut data)?;
    let start = take_u32(&mut data)?;
    let n_accept = take_u32(&mut data)?;

    // sizes come from the header; check them against the payload before
    // allocating anything
    let len = (n_states as usize)
        .checked_mul(n_symbols as usize)
        .ok_or("n_states*n_symbols overflow")?;
    let need = (n_symbols as usize)
        .checked_mul(8)
        .and_then(|a| len.checked_mul(2).and_then(|n| a.checked_add(n)))
        .and_then(|an| (n_accept as usize).checked_mul(8).and_then(|c| an.checked_add(c)))
        .ok_or("lexer tables header sizes overflow")?;
    if data.len() < need {
        return Err(format!(
            "lexer tables bin truncated: header needs {need} payload bytes, found {}",
            data.len()
        ));
    }

    let mut alphabet = Vec::with_capacity(n_symbols as usize);
    for _ in 0..n_symbols {
        let min = take_u32(&mut data)?;
        let max = take_u32(&mut data)?;
        alphabet.push(Range::new(min, max));
    }

    let mut next = Vec::with_capacity(len);
    for _ in 0..len {
        let v = take_u16(&mut data)?;
        next.push(if v == INVALID_STATE_U16 {
            INVALID_STATE
        } else {
            v as u32
        });
    }

    let mut accept = BTreeMap::new();
    for _ in 0..n_accept {
        let s = take_u32(&mut data)?;
        let tok = take_u32(&mut data)?;
        accept.insert(s, tok);
    }

    Ok(LexerTables {
        alphabet,
        n_states,
        n_symbols,
        start,
        next,
        accept,
        token_names: Vec::new(),
    })
}
