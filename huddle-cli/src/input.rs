use huddle_client::EngineCommand;

pub const HELP: &str = "/call /accept /reject /end /mute /camera /quit, anything else is chat";

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Command(EngineCommand),
    Help,
    Unknown(String),
    Empty,
}

pub fn parse_line(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }

    let Some(word) = line.strip_prefix('/') else {
        return Input::Command(EngineCommand::SendChat(line.to_string()));
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "call" => EngineCommand::StartCall,
        "accept" => EngineCommand::AcceptCall,
        "reject" => EngineCommand::RejectCall,
        "end" | "hangup" => EngineCommand::EndCall,
        "mute" => EngineCommand::ToggleMute,
        "camera" | "cam" => EngineCommand::ToggleCamera,
        "quit" | "leave" => EngineCommand::Leave,
        "help" => return Input::Help,
        _ => return Input::Unknown(line.to_string()),
    };
    Input::Command(command)
}
