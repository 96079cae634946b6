use fixture::{contents, SAM};
use saybot_core::request::{CommandRequest, Speaker};
use saybot_core::tts::mock::MockTtsBehavior;
use saybot_core::voice::VoiceManager;


#[test]
fn test_leave_removes_session() {
    fixture::run(|fixture| async move {
        fixture.say("hello").await;
        assert!(fixture.bot.state().sessions.get(fixture.destination()).is_some());

        let replies = fixture.command("/leave").await;

        assert_eq!(contents(&replies), vec!["Left the voice channel."]);
        assert!(fixture.bot.state().sessions.is_empty());
        assert!(!fixture.voice.is_connected(fixture.destination()));
    });
}

#[test]
fn test_leave_when_not_connected() {
    fixture::run(|fixture| async move {
        let replies = fixture.command("/leave").await;

        assert_eq!(contents(&replies), vec!["I am not in a voice channel."]);
        assert!(replies[0].is_error());
    });
}

#[test]
fn test_leave_has_a_cooldown() {
    fixture::run(|fixture| async move {
        fixture.command("/leave").await;

        let replies = fixture.command("/leave").await;

        assert_eq!(replies.len(), 1);
        assert!(replies[0].content.starts_with("Please wait"));
        assert!(replies[0].content.ends_with("before using /leave again."));

        // Other users are not affected
        let other = fixture.request_as(fixture::ALEX, "Alex", "en-US");
        let replies = fixture.command_as(&other, "/leave").await;
        assert_eq!(contents(&replies), vec!["I am not in a voice channel."]);
    });
}

#[test]
fn test_cooldown_can_be_disabled() {
    let fixture = fixture::Fixture::with_settings(MockTtsBehavior::Success, |settings| {
        settings.commands.cooldowns.insert("leave".to_string(), 0);
    });
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async {
        fixture.command("/leave").await;
        let replies = fixture.command("/leave").await;
        assert_eq!(contents(&replies), vec!["I am not in a voice channel."]);
    });
}

#[test]
fn test_leave_aliases_and_localized_names() {
    fixture::run(|fixture| async move {
        fixture.say("hello").await;
        let replies = fixture.command("/disconnect").await;
        assert_eq!(contents(&replies), vec!["Left the voice channel."]);

        let korean = fixture.request_as(fixture::ALEX, "Alex", "ko-KR");
        fixture.command_as(&korean, "/말하기 안녕").await;
        let replies = fixture.command_as(&korean, "/나가기").await;
        assert_eq!(contents(&replies), vec!["음성 채널에서 나왔습니다."]);
    });
}

#[test]
fn test_join_reports_channel_name() {
    fixture::run(|fixture| async move {
        let replies = fixture.command("/join").await;

        assert_eq!(contents(&replies), vec!["Joined voice channel General."]);
        assert!(fixture.voice.is_connected(fixture.destination()));
        assert!(fixture.voice.played().is_empty());
    });
}

#[test]
fn test_join_without_voice_channel() {
    fixture::run(|fixture| async move {
        let request = CommandRequest::new(Speaker::new(SAM, "Sam"), fixture::GUILD, "en-US");

        let replies = fixture.command_as(&request, "/join").await;

        assert_eq!(
            contents(&replies),
            vec!["You need to be in a voice channel first."]
        );
    });
}

#[test]
fn test_unknown_command() {
    fixture::run(|fixture| async move {
        let replies = fixture.command("/dance wildly").await;

        assert_eq!(contents(&replies), vec!["Unknown command: /dance"]);
        assert!(replies[0].is_error());
    });
}

#[test]
fn test_help_lists_commands() {
    fixture::run(|fixture| async move {
        let replies = fixture.command("/help").await;

        assert_eq!(replies.len(), 1);
        let help = &replies[0].content;
        assert!(help.starts_with("Available commands:"));
        assert!(help.contains("/say <message>"));
        assert!(help.contains("Make saybot leave the voice channel"));
        assert!(help.contains("/join"));
    });
}

#[test]
fn test_voices_lists_the_engine_voices() {
    fixture::run(|fixture| async move {
        let replies = fixture.command("/voices").await;

        assert_eq!(
            contents(&replies),
            vec!["Voices on mock (speaking as Mock):\n  * Mock (mock, en-US)"]
        );
        assert!(fixture.tts_calls().is_empty());
    });
}

#[test]
fn test_voices_reports_unknown_engine() {
    let fixture = fixture::Fixture::with_settings(MockTtsBehavior::Success, |settings| {
        settings.tts.default_engine = "missing".to_string()
    });
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async {
        let replies = fixture.command("/voices").await;

        assert_eq!(replies.len(), 1);
        assert!(replies[0].is_error());
        let reports = fixture.reporter.reports();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].message.contains("missing"));
        assert!(replies[0].content.contains(reports[0].token.as_str()));
    });
}

#[test]
fn test_command_metadata() {
    fixture::run(|fixture| async move {
        let specs = fixture.bot.commands();
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["say", "leave", "join", "voices", "help"]);

        let say = &specs[0];
        assert_eq!(say.name_localizations.get("ko-KR").unwrap(), "말하기");
        assert_eq!(say.options[0].name, "message");
        assert_eq!(say.options[0].name_localizations.get("ko-KR").unwrap(), "메시지");
    });
}
