//! Built-in chat commands.

pub const HELP_TEXT: &str = "🤖 飞书AI助手使用指南：

常用命令：
/help - 显示此帮助信息
/test - 测试机器人是否在线
/about - 关于机器人

直接对话：
直接向我提问，我会尽力回答！

技术支持：
如有问题，请检查配置或联系管理员。

当前状态：✅ 运行正常";

pub const TEST_TEXT: &str = "✅ 机器人连接正常！";

pub const ABOUT_TEXT: &str = concat!(
    "📱 飞书AI助手\n版本：",
    env!("CARGO_PKG_VERSION"),
    "\n功能：智能对话、问题解答\n技术支持：GitHub部署\n状态：运行中"
);

/// A built-in command recognised in a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Test,
    About,
}

/// Every accepted spelling, already normalised to lowercase.
const COMMANDS: &[(&str, Command)] = &[
    ("/help", Command::Help),
    ("帮助", Command::Help),
    ("help", Command::Help),
    ("/test", Command::Test),
    ("测试", Command::Test),
    ("ping", Command::Test),
    ("/about", Command::About),
    ("关于", Command::About),
    ("info", Command::About),
];

impl Command {
    /// Match a whole message against the command table, ignoring case and surrounding whitespace.
    pub fn parse(text: &str) -> Option<Command> {
        let normalized = text.trim().to_lowercase();
        COMMANDS
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, command)| *command)
    }

    /// The fixed reply sent for this command.
    pub fn reply(&self) -> &'static str {
        match self {
            Command::Help => HELP_TEXT,
            Command::Test => TEST_TEXT,
            Command::About => ABOUT_TEXT,
        }
    }

    /// The `msg` returned to Feishu in the webhook acknowledgment.
    pub fn ack(&self) -> &'static str {
        match self {
            Command::Help => "help command",
            Command::Test => "test command",
            Command::About => "about command",
        }
    }
}
