//! Grid command - Show the grid layout and legal actions

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::output::{print_kv, print_section, print_subsection},
    gridworld::GridWorld,
};

#[derive(Parser, Debug)]
#[command(about = "Print the grid and the legal actions of every cell")]
pub struct GridArgs {
    /// Grid height (rows)
    #[arg(long, default_value_t = 4)]
    pub height: usize,

    /// Grid width (columns)
    #[arg(long, default_value_t = 4)]
    pub width: usize,
}

pub fn execute(args: GridArgs) -> Result<()> {
    let env = GridWorld::new(args.height, args.width)?;

    print_section(&format!("Grid {}x{}", env.height(), env.width()));
    print!("{env}");

    print_subsection("Legal actions");
    for state in env.all_states() {
        let actions: Vec<String> = env
            .possible_actions(&state)
            .iter()
            .map(ToString::to_string)
            .collect();
        print_kv(&state.to_string(), &actions.join(" "));
    }
    print_kv("Goal", &env.goal_state().to_string());
    print_kv("Terminal", &env.end_state().to_string());
    Ok(())
}
