use std::io::{self, Write};

use serde_json::Value;

use super::config::{OutputConfig, OutputFormat};
use super::types::Envelope;

pub trait Presenter: Send + Sync {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()>;
}

pub struct JsonPresenter { pub pretty: bool }
impl Presenter for JsonPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        if self.pretty { serde_json::to_writer_pretty(&mut *w, env).map_err(to_io)? } else { serde_json::to_writer(&mut *w, env).map_err(to_io)? }
        writeln!(w)
    }
}

pub struct TextPresenter { pub pretty: bool }
impl Presenter for TextPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        let (label, body) = if env.apply { ("Result", &env.result) } else { ("Plan", &env.plan) };
        writeln!(w, "{}: {}", label, env.op)?;
        if let Some(v) = body {
            if self.pretty { serde_json::to_writer_pretty(&mut *w, v).map_err(to_io)?; } else { write_text(w, v, 1)?; }
            writeln!(w)?;
        }
        Ok(())
    }
}

pub struct Emitter {
    presenter: Box<dyn Presenter>,
}

impl Emitter {
    pub fn from_config(cfg: OutputConfig) -> Self {
        let presenter: Box<dyn Presenter> = match cfg.format {
            OutputFormat::Json => Box::new(JsonPresenter { pretty: cfg.pretty }),
            OutputFormat::Text => Box::new(TextPresenter { pretty: cfg.pretty }),
        };
        Emitter { presenter }
    }

    pub fn emit(&self, env: &Envelope) -> io::Result<()> {
        let mut out = io::stdout();
        self.presenter.emit(env, &mut out)?;
        out.flush()
    }
}

// key: value lines, nested objects indented; arrays print one item per line
fn write_text(w: &mut dyn Write, v: &Value, depth: usize) -> io::Result<()> {
    let pad = "  ".repeat(depth);
    match v {
        Value::Object(map) => {
            for (k, val) in map {
                match val {
                    Value::Object(_) | Value::Array(_) => { writeln!(w, "{pad}{k}:")?; write_text(w, val, depth + 1)?; }
                    _ => writeln!(w, "{pad}{k}: {}", scalar(val))?,
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => { writeln!(w, "{pad}-")?; write_text(w, item, depth + 1)?; }
                    _ => writeln!(w, "{pad}- {}", scalar(item))?,
                }
            }
        }
        other => writeln!(w, "{pad}{}", scalar(other))?,
    }
    Ok(())
}

fn scalar(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn to_io(e: serde_json::Error) -> io::Error { io::Error::new(io::ErrorKind::Other, e) }
