#[cfg(test)]
mod tests {
    use actix::prelude::*;
    use std::time::Duration;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
    use tokio::time::timeout;

    use crate::config::game::OPPONENT_DISCONNECTED_REASON;
    use crate::server::error::SessionError;
    use crate::server::protocol::ServerMessage;
    use crate::server::session_manager::SessionManager;
    use crate::server::session_manager::messages::*;
    use crate::server::types::{Color, PlayerId};

    /// Stands in for a connection handler: forwards everything it receives to the test.
    struct PeerStub {
        tx: UnboundedSender<ServerMessage>,
    }

    impl Actor for PeerStub {
        type Context = Context<Self>;
    }

    impl Handler<ServerMessage> for PeerStub {
        type Result = ();

        fn handle(&mut self, msg: ServerMessage, _ctx: &mut Self::Context) {
            let _ = self.tx.send(msg);
        }
    }

    /// Stops the stub as if the connection went away without a `RemovePlayer` yet.
    #[derive(Message)]
    #[rtype(result = "()")]
    struct HangUp;

    impl Handler<HangUp> for PeerStub {
        type Result = ();

        fn handle(&mut self, _msg: HangUp, ctx: &mut Self::Context) {
            ctx.stop();
        }
    }

    struct TestPlayer {
        id: PlayerId,
        peer: Addr<PeerStub>,
        rx: UnboundedReceiver<ServerMessage>,
    }

    impl TestPlayer {
        async fn connect(manager: &Addr<SessionManager>) -> Self {
            let (tx, rx) = unbounded_channel();
            let peer = PeerStub { tx }.start();
            let id = PlayerId::new();
            manager
                .send(RegisterConnection { player_id: id, recipient: peer.clone().recipient() })
                .await
                .unwrap();
            Self { id, peer, rx }
        }

        async fn next(&mut self) -> ServerMessage {
            timeout(Duration::from_secs(1), self.rx.recv())
                .await
                .expect("timed out waiting for a server message")
                .expect("peer stub channel closed")
        }

        /// Stops the peer stub and waits until its mailbox is gone.
        async fn hang_up(&self) {
            self.peer.do_send(HangUp);
            timeout(Duration::from_secs(1), async {
                while self.peer.connected() {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            })
            .await
            .expect("peer stub did not stop");
        }

        async fn assert_silent(&mut self) {
            match timeout(Duration::from_millis(100), self.rx.recv()).await {
                Err(_) | Ok(None) => {}
                Ok(Some(msg)) => panic!("unexpected message {:?}", msg),
            }
        }
    }

    async fn find_game(manager: &Addr<SessionManager>, player: &TestPlayer) -> FindGameOutcome {
        manager.send(FindGame { player_id: player.id }).await.unwrap()
    }

    async fn submit(
        manager: &Addr<SessionManager>,
        player: &TestPlayer,
        token: &str,
    ) -> Result<MoveReceipt, SessionError> {
        manager
            .send(SubmitMove { player_id: player.id, token: token.to_string() })
            .await
            .unwrap()
    }

    async fn paired_game(manager: &Addr<SessionManager>) -> (TestPlayer, TestPlayer) {
        let mut white = TestPlayer::connect(manager).await;
        let mut black = TestPlayer::connect(manager).await;
        find_game(manager, &white).await;
        find_game(manager, &black).await;
        assert_eq!(white.next().await, ServerMessage::game_found(Color::White));
        assert_eq!(black.next().await, ServerMessage::game_found(Color::Black));
        (white, black)
    }

    #[actix::test]
    async fn test_first_requester_plays_white() {
        let manager = SessionManager::new().start();
        let mut a = TestPlayer::connect(&manager).await;
        let mut b = TestPlayer::connect(&manager).await;

        assert_eq!(find_game(&manager, &a).await, FindGameOutcome::Queued);
        a.assert_silent().await;

        match find_game(&manager, &b).await {
            FindGameOutcome::Paired { color, .. } => assert_eq!(color, Color::Black),
            other => panic!("expected a pairing, got {:?}", other),
        }
        assert_eq!(a.next().await, ServerMessage::game_found(Color::White));
        assert_eq!(b.next().await, ServerMessage::game_found(Color::Black));

        let snapshot = manager.send(LookupSession { player_id: a.id }).await.unwrap().unwrap();
        assert_eq!(snapshot.white, a.id);
        assert_eq!(snapshot.black, b.id);
        assert_eq!(snapshot.current_turn, Color::White);
    }

    #[actix::test]
    async fn test_pairing_is_fifo() {
        let manager = SessionManager::new().start();
        let a = TestPlayer::connect(&manager).await;
        let b = TestPlayer::connect(&manager).await;
        let c = TestPlayer::connect(&manager).await;
        let d = TestPlayer::connect(&manager).await;

        find_game(&manager, &a).await;
        find_game(&manager, &b).await;
        assert_eq!(find_game(&manager, &c).await, FindGameOutcome::Queued);
        find_game(&manager, &d).await;

        let first = manager.send(LookupSession { player_id: b.id }).await.unwrap().unwrap();
        assert_eq!((first.white, first.black), (a.id, b.id));
        let second = manager.send(LookupSession { player_id: d.id }).await.unwrap().unwrap();
        assert_eq!((second.white, second.black), (c.id, d.id));
        assert_ne!(first.id, second.id);
    }

    #[actix::test]
    async fn test_repeated_find_game_never_pairs_with_self() {
        let manager = SessionManager::new().start();
        let mut a = TestPlayer::connect(&manager).await;
        let b = TestPlayer::connect(&manager).await;

        assert_eq!(find_game(&manager, &a).await, FindGameOutcome::Queued);
        assert_eq!(find_game(&manager, &a).await, FindGameOutcome::Queued);
        a.assert_silent().await;
        assert!(manager.send(LookupSession { player_id: a.id }).await.unwrap().is_none());

        let outcome = find_game(&manager, &b).await;
        assert!(matches!(outcome, FindGameOutcome::Paired { color: Color::Black, .. }));
        let snapshot = manager.send(LookupSession { player_id: a.id }).await.unwrap().unwrap();
        assert_eq!((snapshot.white, snapshot.black), (a.id, b.id));
    }

    #[actix::test]
    async fn test_find_game_while_playing_resumes() {
        let manager = SessionManager::new().start();
        let (mut white, mut black) = paired_game(&manager).await;

        let outcome = find_game(&manager, &white).await;
        assert!(matches!(outcome, FindGameOutcome::Resumed { color: Color::White, .. }));
        assert_eq!(white.next().await, ServerMessage::game_found(Color::White));
        black.assert_silent().await;
    }

    #[actix::test]
    async fn test_move_is_relayed_and_turn_flips() {
        let manager = SessionManager::new().start();
        let (mut white, mut black) = paired_game(&manager).await;

        let receipt = submit(&manager, &white, "1234").await.unwrap();
        assert_eq!(receipt.opponent, black.id);
        assert_eq!(receipt.ply, 1);
        assert_eq!(receipt.next_turn, Color::Black);
        assert!(receipt.delivered);
        assert_eq!(black.next().await, ServerMessage::relay_move("1234"));
        white.assert_silent().await;

        let receipt = submit(&manager, &black, "6444").await.unwrap();
        assert_eq!(receipt.opponent, white.id);
        assert_eq!(white.next().await, ServerMessage::relay_move("6444"));

        let snapshot = manager.send(LookupSession { player_id: black.id }).await.unwrap().unwrap();
        assert_eq!(snapshot.moves, vec!["1234".to_string(), "6444".to_string()]);
        assert_eq!(snapshot.current_turn, Color::White);
    }

    #[actix::test]
    async fn test_double_move_is_rejected_without_relay() {
        let manager = SessionManager::new().start();
        let (mut white, mut black) = paired_game(&manager).await;

        submit(&manager, &white, "1234").await.unwrap();
        assert_eq!(black.next().await, ServerMessage::relay_move("1234"));

        let err = submit(&manager, &white, "1333").await.unwrap_err();
        assert_eq!(err, SessionError::OutOfTurn { expected: Color::Black });
        match white.next().await {
            ServerMessage::Error { code, .. } => assert_eq!(code, "OUT_OF_TURN"),
            other => panic!("expected an error, got {:?}", other),
        }
        black.assert_silent().await;

        let snapshot = manager.send(LookupSession { player_id: white.id }).await.unwrap().unwrap();
        assert_eq!(snapshot.moves, vec!["1234".to_string()]);
        assert_eq!(snapshot.current_turn, Color::Black);
    }

    #[actix::test]
    async fn test_move_outside_a_game_is_rejected() {
        let manager = SessionManager::new().start();
        let mut loner = TestPlayer::connect(&manager).await;

        assert_eq!(submit(&manager, &loner, "1234").await, Err(SessionError::NotInGame));
        match loner.next().await {
            ServerMessage::Error { code, .. } => assert_eq!(code, "NOT_IN_GAME"),
            other => panic!("expected an error, got {:?}", other),
        }

        find_game(&manager, &loner).await;
        assert_eq!(submit(&manager, &loner, "1234").await, Err(SessionError::NotInGame));
    }

    #[actix::test]
    async fn test_empty_move_is_rejected() {
        let manager = SessionManager::new().start();
        let (mut white, mut black) = paired_game(&manager).await;

        let err = manager
            .send(SubmitMove { player_id: white.id, token: String::new() })
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(err, SessionError::EmptyMove);
        match white.next().await {
            ServerMessage::Error { code, .. } => assert_eq!(code, "EMPTY_MOVE"),
            other => panic!("expected an error, got {:?}", other),
        }
        black.assert_silent().await;

        let snapshot = manager.send(LookupSession { player_id: white.id }).await.unwrap().unwrap();
        assert!(snapshot.moves.is_empty());
        assert_eq!(snapshot.current_turn, Color::White);
    }

    #[actix::test]
    async fn test_move_to_closed_connection_is_still_recorded() {
        let manager = SessionManager::new().start();
        let (white, black) = paired_game(&manager).await;
        black.hang_up().await;

        let receipt = submit(&manager, &white, "1234").await.unwrap();
        assert!(!receipt.delivered);
        assert_eq!(receipt.opponent, black.id);
        assert_eq!(receipt.next_turn, Color::Black);

        let snapshot = manager.send(LookupSession { player_id: white.id }).await.unwrap().unwrap();
        assert_eq!(snapshot.moves, vec!["1234".to_string()]);
        assert_eq!(snapshot.current_turn, Color::Black);
    }

    #[actix::test]
    async fn test_disconnect_mid_game_notifies_opponent_once() {
        let manager = SessionManager::new().start();
        let (mut white, black) = paired_game(&manager).await;

        let notified = manager.send(RemovePlayer { player_id: black.id }).await.unwrap();
        assert_eq!(notified, Some(white.id));
        assert_eq!(white.next().await, ServerMessage::game_over(OPPONENT_DISCONNECTED_REASON));
        assert!(manager.send(LookupSession { player_id: white.id }).await.unwrap().is_none());

        // Removing again is a no-op.
        let notified = manager.send(RemovePlayer { player_id: black.id }).await.unwrap();
        assert_eq!(notified, None);
        white.assert_silent().await;

        assert_eq!(submit(&manager, &white, "1234").await, Err(SessionError::NotInGame));
    }

    #[actix::test]
    async fn test_waiting_player_removal_clears_queue() {
        let manager = SessionManager::new().start();
        let a = TestPlayer::connect(&manager).await;
        let mut b = TestPlayer::connect(&manager).await;

        find_game(&manager, &a).await;
        assert_eq!(manager.send(RemovePlayer { player_id: a.id }).await.unwrap(), None);

        assert_eq!(find_game(&manager, &b).await, FindGameOutcome::Queued);
        b.assert_silent().await;
    }

    #[actix::test]
    async fn test_end_session_notifies_both_and_forgets_players() {
        let manager = SessionManager::new().start();
        let (mut white, mut black) = paired_game(&manager).await;
        let session_id = manager
            .send(LookupSession { player_id: white.id })
            .await
            .unwrap()
            .unwrap()
            .id;

        let ended = manager
            .send(EndSession { session_id, reason: "Checkmate".to_string() })
            .await
            .unwrap();
        assert!(ended);
        assert_eq!(white.next().await, ServerMessage::game_over("Checkmate"));
        assert_eq!(black.next().await, ServerMessage::game_over("Checkmate"));

        assert!(manager.send(LookupSession { player_id: white.id }).await.unwrap().is_none());
        assert!(manager.send(LookupSession { player_id: black.id }).await.unwrap().is_none());

        let ended = manager
            .send(EndSession { session_id, reason: "Checkmate".to_string() })
            .await
            .unwrap();
        assert!(!ended);
        white.assert_silent().await;

        // A new search starts from a fresh queue entry.
        assert_eq!(find_game(&manager, &white).await, FindGameOutcome::Queued);
        assert!(matches!(
            find_game(&manager, &black).await,
            FindGameOutcome::Paired { color: Color::Black, .. }
        ));
    }

    #[actix::test]
    async fn test_resignation_ends_game_for_both() {
        let manager = SessionManager::new().start();
        let (mut white, mut black) = paired_game(&manager).await;

        manager
            .send(ConcludeGame { player_id: black.id, reason: "Black resigned".to_string() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(white.next().await, ServerMessage::game_over("Black resigned"));
        assert_eq!(black.next().await, ServerMessage::game_over("Black resigned"));

        let err = manager
            .send(ConcludeGame { player_id: black.id, reason: "Black resigned".to_string() })
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(err, SessionError::NotInGame);
    }

    #[actix::test]
    async fn test_disconnect_after_game_over_sends_nothing() {
        let manager = SessionManager::new().start();
        let (mut white, black) = paired_game(&manager).await;

        manager
            .send(ConcludeGame { player_id: white.id, reason: "Draw".to_string() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(white.next().await, ServerMessage::game_over("Draw"));

        assert_eq!(manager.send(RemovePlayer { player_id: black.id }).await.unwrap(), None);
        white.assert_silent().await;
    }
}

/// End-to-end scenarios: a real HTTP server, the `/ws` route and WebSocket clients.
#[cfg(test)]
mod websocket {
    use actix::Actor;
    use actix_http::ws::{Frame, Item, Message, ProtocolError};
    use actix_web::{web, App};
    use futures_util::{Sink, SinkExt, Stream, StreamExt};
    use std::time::Duration;
    use tokio::time::timeout;

    use crate::config::game::OPPONENT_DISCONNECTED_REASON;
    use crate::config::server::WS_PATH;
    use crate::server::protocol::ServerMessage;
    use crate::server::session_manager::SessionManager;
    use crate::server::state::AppState;
    use crate::server::types::Color;

    fn start_server() -> actix_test::TestServer {
        let manager = SessionManager::new().start();
        let state = web::Data::new(AppState::new(manager));
        actix_test::start(move || {
            App::new()
                .app_data(state.clone())
                .configure(crate::server::router::config)
        })
    }

    async fn send_text<S>(conn: &mut S, text: &str)
    where
        S: Sink<Message, Error = ProtocolError> + Unpin,
    {
        conn.send(Message::Text(text.to_string().into())).await.unwrap();
    }

    async fn recv<S>(conn: &mut S) -> ServerMessage
    where
        S: Stream<Item = Result<Frame, ProtocolError>> + Unpin,
    {
        loop {
            let frame = timeout(Duration::from_secs(2), conn.next())
                .await
                .expect("timed out waiting for a server frame")
                .expect("connection closed")
                .unwrap();
            match frame {
                Frame::Text(bytes) => return serde_json::from_slice(&bytes).unwrap(),
                Frame::Ping(_) | Frame::Pong(_) => continue,
                other => panic!("unexpected frame {:?}", other),
            }
        }
    }

    fn error_code(msg: ServerMessage) -> String {
        match msg {
            ServerMessage::Error { code, .. } => code,
            other => panic!("expected an error, got {:?}", other),
        }
    }

    fn color_of(msg: ServerMessage) -> Color {
        match msg {
            ServerMessage::GameFound { color } => color,
            other => panic!("expected game_found, got {:?}", other),
        }
    }

    #[actix::test]
    async fn test_invalid_json_keeps_connection_open() {
        let mut srv = start_server();
        let mut conn = srv.ws_at(WS_PATH).await.unwrap();

        send_text(&mut conn, "not json").await;
        assert_eq!(error_code(recv(&mut conn).await), "INVALID_MESSAGE");

        // Same connection, still answering: a move outside a game is refused locally.
        send_text(&mut conn, r#"{"type":"move","move":"6444"}"#).await;
        assert_eq!(error_code(recv(&mut conn).await), "NOT_IN_GAME");
        send_text(&mut conn, r#"{"type":"resign"}"#).await;
        assert_eq!(error_code(recv(&mut conn).await), "NOT_IN_GAME");
    }

    #[actix::test]
    async fn test_binary_frame_is_unsupported() {
        let mut srv = start_server();
        let mut conn = srv.ws_at(WS_PATH).await.unwrap();

        conn.send(Message::Binary(web::Bytes::from_static(b"\x01\x02")))
            .await
            .unwrap();
        assert_eq!(error_code(recv(&mut conn).await), "UNSUPPORTED_FRAME");
    }

    #[actix::test]
    async fn test_paired_clients_relay_moves_and_resign() {
        let mut srv = start_server();
        let mut a = srv.ws_at(WS_PATH).await.unwrap();
        let mut b = srv.ws_at(WS_PATH).await.unwrap();

        send_text(&mut a, r#"{"type":"connect","message":"New client connected"}"#).await;
        send_text(&mut a, r#"{"type":"find_game"}"#).await;
        send_text(&mut b, r#"{"type":"find_game"}"#).await;
        let color_a = color_of(recv(&mut a).await);
        let color_b = color_of(recv(&mut b).await);
        assert_eq!(color_b, color_a.opposite());

        let (mut white, mut black) = if color_a == Color::White { (a, b) } else { (b, a) };

        send_text(&mut white, r#"{"type":"move","move":"6444"}"#).await;
        assert_eq!(recv(&mut black).await, ServerMessage::relay_move("6444"));
        send_text(&mut white, r#"{"type":"move","move":"6343"}"#).await;
        assert_eq!(error_code(recv(&mut white).await), "OUT_OF_TURN");

        send_text(&mut black, r#"{"type":"resign"}"#).await;
        assert_eq!(recv(&mut white).await, ServerMessage::game_over("Black resigned"));
        assert_eq!(recv(&mut black).await, ServerMessage::game_over("Black resigned"));
    }

    #[actix::test]
    async fn test_close_frame_ends_game_for_opponent() {
        let mut srv = start_server();
        let mut a = srv.ws_at(WS_PATH).await.unwrap();
        let mut b = srv.ws_at(WS_PATH).await.unwrap();

        send_text(&mut a, r#"{"type":"find_game"}"#).await;
        send_text(&mut b, r#"{"type":"find_game"}"#).await;
        color_of(recv(&mut a).await);
        color_of(recv(&mut b).await);

        a.send(Message::Close(None)).await.unwrap();
        assert_eq!(
            recv(&mut b).await,
            ServerMessage::game_over(OPPONENT_DISCONNECTED_REASON)
        );

        // The survivor is out of the game.
        send_text(&mut b, r#"{"type":"move","move":"6444"}"#).await;
        assert_eq!(error_code(recv(&mut b).await), "NOT_IN_GAME");
    }

    #[actix::test]
    async fn test_fragmented_find_game_is_reassembled() {
        let mut srv = start_server();
        let mut a = srv.ws_at(WS_PATH).await.unwrap();
        let mut b = srv.ws_at(WS_PATH).await.unwrap();

        a.send(Message::Continuation(Item::FirstText(web::Bytes::from_static(
            b"{\"type\":\"find_",
        ))))
        .await
        .unwrap();
        a.send(Message::Continuation(Item::Last(web::Bytes::from_static(b"game\"}"))))
            .await
            .unwrap();
        send_text(&mut b, r#"{"type":"find_game"}"#).await;

        let color_a = color_of(recv(&mut a).await);
        let color_b = color_of(recv(&mut b).await);
        assert_eq!(color_b, color_a.opposite());
    }
}
