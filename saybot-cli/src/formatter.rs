use saybot_core::reply::Reply;
use std::path::Path;

#[derive(Clone)]
pub struct Formatter {
    use_colors: bool,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    pub fn print_system(&self, msg: &str) {
        if self.use_colors {
            println!("\x1b[33m[System]\x1b[0m {msg}");
        } else {
            println!("[System] {msg}");
        }
    }

    pub fn print_bot(&self, msg: &str) {
        if self.use_colors {
            println!("\x1b[32m[saybot]\x1b[0m {msg}");
        } else {
            println!("[saybot] {msg}");
        }
    }

    pub fn print_error(&self, msg: &str) {
        if self.use_colors {
            eprintln!("\x1b[31m[Error]\x1b[0m {msg}");
        } else {
            eprintln!("[Error] {msg}");
        }
    }

    pub fn print_reply(&self, reply: &Reply) {
        if reply.is_error() {
            self.print_error(&reply.content);
        } else {
            self.print_bot(&reply.content);
        }
    }

    pub fn print_audio(&self, text: &str, path: &Path) {
        if self.use_colors {
            println!("\x1b[36m🔊 {text}\x1b[0m \x1b[90m-> {}\x1b[0m", path.display());
        } else {
            println!("🔊 {text} -> {}", path.display());
        }
    }

    pub fn prompt(&self) -> &'static str {
        if self.use_colors {
            "\x1b[35m>\x1b[0m "
        } else {
            "> "
        }
    }
}
