pub mod graph;
pub mod page;
pub mod result;
pub mod theme;

pub use graph::GraphView;
pub use page::SearchPage;
pub use result::SearchResult;
pub use theme::{ColorMode, Palette};

use colored::Colorize;

pub fn print_banner() {
    let banner = r#"
    ██████╗  █████╗ ██████╗ ██████╗ ██╗████████╗██╗  ██╗ ██████╗ ██╗     ███████╗
    ██╔══██╗██╔══██╗██╔══██╗██╔══██╗██║╚══██╔══╝██║  ██║██╔═══██╗██║     ██╔════╝
    ██████╔╝███████║██████╔╝██████╔╝██║   ██║   ███████║██║   ██║██║     █████╗
    ██╔══██╗██╔══██║██╔══██╗██╔══██╗██║   ██║   ██╔══██║██║   ██║██║     ██╔══╝
    ██║  ██║██║  ██║██████╔╝██████╔╝██║   ██║   ██║  ██║╚██████╔╝███████╗███████╗
    ╚═╝  ╚═╝╚═╝  ╚═╝╚═════╝ ╚═════╝ ╚═╝   ╚═╝   ╚═╝  ╚═╝ ╚═════╝ ╚══════╝╚══════╝
"#;
    println!("{}", banner.bright_blue());
    println!(
        "    {}",
        "Discover unexpected connections between topics".bright_white()
    );
    println!();
}
