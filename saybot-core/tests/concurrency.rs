use std::time::Duration;

use fixture::{contents, ALEX, SAM};
use saybot_core::tts::mock::MockTtsBehavior;


#[test]
fn test_concurrent_says_coalesce_into_one_pass() {
    fixture::run_with_behavior(MockTtsBehavior::Delayed { millis: 20 }, |fixture| async move {
        let (a, b, c) = tokio::join!(
            fixture.say("first"),
            fixture.say("second"),
            fixture.say("third"),
        );

        for replies in [&a, &b, &c] {
            assert_eq!(replies.len(), 1, "unexpected replies: {:?}", contents(replies));
            assert!(!replies[0].is_error());
        }

        assert_eq!(
            fixture.voice.played_texts(),
            vec!["first", "second", "third"]
        );
        assert_eq!(fixture.tts_calls().len(), 3);
        assert_eq!(fixture.voice.join_attempts(), 1);

        let session = fixture.bot.state().sessions.get(fixture.destination()).unwrap();
        assert!(!session.is_busy());
        assert_eq!(session.pending(), 0);
    });
}

#[test]
fn test_back_to_back_playback_never_overlaps() {
    fixture::run(|fixture| async move {
        fixture.voice.set_play_delay(Duration::from_millis(30));

        let sam = fixture.request_as(SAM, "Sam", "en-US");
        let alex = fixture.request_as(ALEX, "Alex", "en-US");
        let (a, b) = tokio::join!(
            fixture.command_as(&sam, "/say from sam"),
            fixture.command_as(&alex, "/say from alex"),
        );

        // An overlapping play would have surfaced as a generic error reply
        assert!(a.iter().chain(&b).all(|r| !r.is_error()));
        assert!(fixture.reporter.reports().is_empty());

        let played = fixture.voice.played();
        assert_eq!(played.len(), 2);
        assert_eq!(played[0].segment.speaker.display_name, "Sam");
        assert_eq!(played[1].segment.speaker.display_name, "Alex");
    });
}

#[test]
fn test_dispatches_during_playback_are_played_afterwards() {
    fixture::run_with_behavior(MockTtsBehavior::Delayed { millis: 5 }, |fixture| async move {
        fixture.voice.set_play_delay(Duration::from_millis(10));

        let (a, b, c, d, e) = tokio::join!(
            fixture.say("one"),
            fixture.say("two"),
            fixture.say("three"),
            fixture.say("four"),
            fixture.say("five"),
        );

        assert!([a, b, c, d, e].iter().flatten().all(|r| !r.is_error()));
        assert_eq!(
            fixture.voice.played_texts(),
            vec!["one", "two", "three", "four", "five"]
        );

        // A later dispatch on an idle session starts a fresh pass
        fixture.say("six").await;
        assert_eq!(fixture.voice.played_texts().len(), 6);
    });
}
