use clap::{Args, Command};
use clap_complete::{generate, shells::Shell};

/// Generate tab-completion scripts for supported shells.
#[derive(Args, Debug)]
#[command(after_help = "Use --help for installation help.", after_long_help = COMPLETIONS_HELP)]
pub struct CompleteCommand {
    shell: Shell,
}

impl CompleteCommand {
    pub fn generate_completion_file<F, W>(self, build_cli: F, stdout: &mut W)
    where
        F: FnOnce() -> Command,
        W: std::io::Write,
    {
        generate(self.shell, &mut build_cli(), "texcore", stdout);
    }
}

pub(crate) static COMPLETIONS_HELP: &str = r"DISCUSSION:
    Enable tab completion for Bash, Fish, Zsh, or PowerShell.
    The script is output on `stdout`, allowing one to re-direct the
    output to the file of their choosing. Where you place the file
    will depend on which shell, and which operating system you are
    using.
    BASH:
        $ mkdir -p ~/.local/share/bash-completion/completions
        $ texcore completions bash >> ~/.local/share/bash-completion/completions/texcore
    FISH:
        $ mkdir -p ~/.config/fish/completions
        $ texcore completions fish > ~/.config/fish/completions/texcore.fish
    ZSH:
        $ mkdir ~/.zfunc
        fpath+=~/.zfunc
        $ texcore completions zsh > ~/.zfunc/_texcore
    POWERSHELL:
        PS C:\> texcore completions powershell >> $profile";
