/// What a connected client can send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// `voice-command`: one raw phrase.
    VoiceCommand(String),
    /// `get-calendar-events`: push every calendar entry.
    GetCalendarEvents,
    /// `get-week-moods`: push this week's moods, newest first.
    GetWeekMoods,
}

impl InboundEvent {
    /// Line protocol used by the CLI driver. Slash commands are queries, everything else is speech.
    pub fn from_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        match trimmed {
            "" => None,
            "/calendar" => Some(InboundEvent::GetCalendarEvents),
            "/moods" => Some(InboundEvent::GetWeekMoods),
            _ => Some(InboundEvent::VoiceCommand(line.to_string())),
        }
    }
}
