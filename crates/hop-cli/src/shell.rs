use crate::commands::Shell;

const BASH: &str = include_str!("../shell/hop.bash");
const ZSH: &str = include_str!("../shell/hop.zsh");
const FISH: &str = include_str!("../shell/hop.fish");

/// Script that wires the `cd` hook, the `j` function, and completion into `shell`.
pub fn init_script(shell: Shell) -> &'static str {
    match shell {
        Shell::Bash => BASH,
        Shell::Zsh => ZSH,
        Shell::Fish => FISH,
    }
}
