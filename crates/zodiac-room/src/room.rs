//! The room state machine.
//!
//! [`Room`] owns everything about one room: players, configuration,
//! phase, the current round(s), ballots, the priority rotation and the
//! room's [`Timers`]. It is synchronous and does no I/O. Every operation
//! returns the events to deliver as `(Recipient, ServerEvent)` pairs and
//! the room actor does the delivery.
//!
//! Player mistakes (unknown player, wrong phase, unknown tile) are never
//! errors: the operation logs and returns no events.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};
use zodiac_protocol::{
    Ballot, ClientEvent, GameConfig, GamePhase, InstanceId, PlayerId, PlayerView,
    RawConfig, Recipient, RoomId, ScoreEntry, ServerEvent, TurnMode,
};
use zodiac_timer::{TimerFired, Timers};

use crate::catalog::catalog;
use crate::reveal::{self, Priority};
use crate::round::{self, Round};
use crate::score;

/// Events produced by one room operation.
pub type Outbound = Vec<(Recipient, ServerEvent)>;

/// A player record. Keyed by connection identity; `username` is what
/// survives a reconnect.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub score: i64,
    pub is_active: bool,
    pub turns_completed: u32,
    /// Tiles of the player's current round that were already scored.
    picked: HashSet<InstanceId>,
}

impl Player {
    fn new(id: PlayerId, username: String) -> Self {
        Self {
            id,
            username,
            score: 0,
            is_active: true,
            turns_completed: 0,
            picked: HashSet::new(),
        }
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            username: self.username.clone(),
            score: self.score,
            is_active: self.is_active,
            turns_completed: self.turns_completed,
        }
    }
}

/// Result of [`Room::join`].
#[derive(Debug)]
pub struct JoinOutcome {
    /// The stale connection identity whose record moved to the joiner.
    pub replaced: Option<PlayerId>,
    pub events: Outbound,
}

pub struct Room {
    id: RoomId,
    players: BTreeMap<PlayerId, Player>,
    config: GameConfig,
    /// `false` until a configuration has been adopted or set.
    configured: bool,
    phase: GamePhase,
    current_turn: u32,
    /// The shared round (room mode) or the suggestion grid.
    round: Round,
    /// Personal mode: each player's own current round.
    personal: HashMap<PlayerId, Round>,
    /// Suggestion mode ballots, in selection order.
    selections: HashMap<PlayerId, Vec<InstanceId>>,
    stt: usize,
    stt_owner: Option<PlayerId>,
    timers: Timers,
    rng: StdRng,
    created_at: Instant,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self::with_rng(id, StdRng::from_os_rng())
    }

    /// Creates a room drawing its randomness from `rng`.
    pub fn with_rng(id: RoomId, rng: StdRng) -> Self {
        Self {
            id,
            players: BTreeMap::new(),
            config: GameConfig::default(),
            configured: false,
            phase: GamePhase::Waiting,
            current_turn: 0,
            round: Round::default(),
            personal: HashMap::new(),
            selections: HashMap::new(),
            stt: 0,
            stt_owner: None,
            timers: Timers::new(),
            rng,
            created_at: Instant::now(),
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn current_turn(&self) -> u32 {
        self.current_turn
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.get(&player_id)
    }

    pub fn player_by_name(&self, username: &str) -> Option<&Player> {
        self.players.values().find(|p| p.username == username)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn active_count(&self) -> usize {
        self.players.values().filter(|p| p.is_active).count()
    }

    /// Owned snapshots of every player, active or not.
    pub fn player_views(&self) -> Vec<PlayerView> {
        self.players.values().map(Player::view).collect()
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn personal_round(&self, player_id: PlayerId) -> Option<&Round> {
        self.personal.get(&player_id)
    }

    pub fn selections(&self, player_id: PlayerId) -> &[InstanceId] {
        self.selections
            .get(&player_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn stt(&self) -> usize {
        self.stt
    }

    pub fn stt_owner(&self) -> Option<PlayerId> {
        self.stt_owner
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn timers_mut(&mut self) -> &mut Timers {
        &mut self.timers
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    fn scores(&self) -> Vec<ScoreEntry> {
        self.players
            .values()
            .map(|p| ScoreEntry {
                id: p.id,
                username: p.username.clone(),
                score: p.score,
            })
            .collect()
    }

    fn is_member(&self, player_id: PlayerId, event: &str) -> bool {
        let known = self.players.contains_key(&player_id);
        if !known {
            debug!(room_id = %self.id, %player_id, event, "event from non-member, ignoring");
        }
        known
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Routes a client event to its operation.
    ///
    /// `join_room` is not handled here: joining also registers the
    /// connection's outbound channel, so it goes through [`Room::join`].
    pub fn handle(&mut self, player_id: PlayerId, event: ClientEvent) -> Outbound {
        match event {
            ClientEvent::JoinRoom(_) => {
                debug!(room_id = %self.id, %player_id, "join_room routed as a plain event, ignoring");
                Vec::new()
            }
            ClientEvent::ChangeConfig(req) => self.change_config(player_id, req.config.as_ref()),
            ClientEvent::StartGame(req) => self.start_game(player_id, req.config.as_ref()),
            ClientEvent::StartGameSuggest(req) => {
                self.start_game_suggest(player_id, req.config.as_ref())
            }
            ClientEvent::RequestNextTurnTimeout(_) => self.request_turn_timeout(player_id),
            ClientEvent::SubmitWin(_) => self.submit_win(player_id),
            ClientEvent::SubmitWrong(_) => self.submit_wrong(player_id),
            ClientEvent::SelectAnimal(tile) => self.select_animal(player_id, tile.instance_id),
            ClientEvent::ToggleSelection(tile) => {
                self.toggle_selection(player_id, tile.instance_id)
            }
            ClientEvent::HostConfirmReveal(_) => self.host_confirm_reveal(player_id),
            ClientEvent::NewTurnSuggest(_) => self.new_turn_suggest(player_id),
            ClientEvent::ForceEndGame(_) => self.force_end_game(player_id),
            ClientEvent::Stt(_) => self.stt_rotate(player_id),
        }
    }

    /// Reacts to one of the room's timers firing.
    pub fn on_timer(&mut self, fired: TimerFired) -> Outbound {
        match fired {
            TimerFired::Turn { tick } => {
                if self.phase != GamePhase::Playing || self.config.turn_mode != TurnMode::Room {
                    self.timers.cancel_turn();
                    return Vec::new();
                }
                self.current_turn += 1;
                debug!(room_id = %self.id, tick, turn = self.current_turn, "turn timer");
                if self.current_turn > self.config.max_turns {
                    return self.end_game();
                }
                self.deal_shared()
            }
            TimerFired::GameTimeout => {
                if self.phase != GamePhase::Playing {
                    return Vec::new();
                }
                info!(room_id = %self.id, turn = self.current_turn, "game time is up");
                self.end_game()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Adds a player, or moves an existing record with the same username
    /// to this connection.
    pub fn join(
        &mut self,
        player_id: PlayerId,
        username: &str,
        raw: Option<&RawConfig>,
    ) -> JoinOutcome {
        let mut replaced = None;
        let existing = self.player_by_name(username).map(|p| p.id);

        match existing {
            Some(old) if old == player_id => {
                if let Some(player) = self.players.get_mut(&player_id) {
                    player.is_active = true;
                }
            }
            // A connection that already owns a record keeps it, whatever
            // name it joins under. The record holding that name stays put.
            _ if self.players.contains_key(&player_id) => {
                if let Some(player) = self.players.get_mut(&player_id) {
                    player.is_active = true;
                }
                debug!(room_id = %self.id, %player_id, username, "connection already joined");
            }
            Some(old) => {
                if let Some(mut player) = self.players.remove(&old) {
                    player.id = player_id;
                    player.is_active = true;
                    self.players.insert(player_id, player);
                }
                if let Some(ballot) = self.selections.remove(&old) {
                    self.selections.insert(player_id, ballot);
                }
                if let Some(round) = self.personal.remove(&old) {
                    self.personal.insert(player_id, round);
                }
                if self.stt_owner == Some(old) {
                    self.stt_owner = Some(player_id);
                }
                replaced = Some(old);
                info!(room_id = %self.id, %player_id, previous = %old, username, "player reconnected");
            }
            None => {
                self.players
                    .insert(player_id, Player::new(player_id, username.to_owned()));
                info!(
                    room_id = %self.id,
                    %player_id,
                    username,
                    players = self.players.len(),
                    "player joined"
                );
            }
        }

        if let (false, Some(raw)) = (self.configured, raw) {
            self.config = GameConfig::from_raw(raw);
            self.configured = true;
        }

        let mut events = vec![(Recipient::All, ServerEvent::UpdatePlayers(self.player_views()))];
        if self.configured {
            events.push((
                Recipient::Player(player_id),
                ServerEvent::UpdateConfig(self.config.clone()),
            ));
        }
        events.extend(self.catch_up(player_id));

        JoinOutcome { replaced, events }
    }

    /// Brings a (re)joining player up to date with the game in progress.
    fn catch_up(&mut self, player_id: PlayerId) -> Outbound {
        let to = Recipient::Player(player_id);
        match self.phase {
            GamePhase::Playing => match self.config.turn_mode {
                TurnMode::Room => vec![(
                    to,
                    ServerEvent::NewTurn(self.round.turn_data(self.current_turn, &self.config)),
                )],
                TurnMode::Personal => {
                    let Some(player) = self.players.get(&player_id) else {
                        return Vec::new();
                    };
                    if let Some(round) = self.personal.get(&player_id) {
                        let data = round.turn_data(player.turns_completed + 1, &self.config);
                        vec![(to, ServerEvent::PersonalNewTurn(data))]
                    } else if player.turns_completed >= self.config.max_turns {
                        vec![(
                            to,
                            ServerEvent::PersonalGameFinished {
                                score: player.score,
                                turns_completed: player.turns_completed,
                            },
                        )]
                    } else {
                        self.deal_personal(player_id)
                    }
                }
            },
            GamePhase::Selecting | GamePhase::Revealed => {
                let mut out = vec![(to.clone(), self.suggest_data())];
                if self.phase == GamePhase::Selecting {
                    out.push((
                        to,
                        ServerEvent::YourSelectionsUpdated {
                            selections: self.selections(player_id).to_vec(),
                        },
                    ));
                }
                out
            }
            GamePhase::Waiting | GamePhase::Ended => Vec::new(),
        }
    }

    /// Marks a player inactive. The record stays until the room is gone.
    pub fn disconnect(&mut self, player_id: PlayerId) -> Outbound {
        let Some(player) = self.players.get_mut(&player_id) else {
            return Vec::new();
        };
        player.is_active = false;
        let username = player.username.clone();
        info!(
            room_id = %self.id,
            %player_id,
            username,
            active = self.active_count(),
            "player disconnected"
        );

        let mut out = vec![(Recipient::All, ServerEvent::UpdatePlayers(self.player_views()))];
        out.extend(self.end_if_all_finished());
        out
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Replaces the configuration, keeping the current boss. Timers keep
    /// running with the old cadence.
    pub fn change_config(&mut self, player_id: PlayerId, raw: Option<&RawConfig>) -> Outbound {
        if !self.is_member(player_id, "change_config") {
            return Vec::new();
        }
        let boss = self.config.boss.take();
        self.config = GameConfig {
            boss,
            ..raw.map(GameConfig::from_raw).unwrap_or_default()
        };
        self.configured = true;
        debug!(room_id = %self.id, %player_id, config = ?self.config, "config changed");
        vec![(Recipient::All, ServerEvent::UpdateConfig(self.config.clone()))]
    }

    fn adopt_game_config(&mut self, player_id: PlayerId, raw: Option<&RawConfig>) -> bool {
        let Some(boss) = self.players.get(&player_id).map(|p| p.username.clone()) else {
            debug!(room_id = %self.id, %player_id, "game start from non-member, ignoring");
            return false;
        };
        self.config = raw
            .map(GameConfig::from_raw)
            .unwrap_or_default()
            .with_boss(boss);
        self.configured = true;
        self.timers.cancel_all();
        self.personal.clear();
        self.selections.clear();
        true
    }

    // -----------------------------------------------------------------------
    // Classic game
    // -----------------------------------------------------------------------

    /// Starts a classic game stamped with the requester as boss.
    pub fn start_game(&mut self, player_id: PlayerId, raw: Option<&RawConfig>) -> Outbound {
        if !self.adopt_game_config(player_id, raw) {
            return Vec::new();
        }
        self.current_turn = 0;
        self.round = Round::default();
        info!(
            room_id = %self.id,
            %player_id,
            mode = %self.config.turn_mode,
            max_turns = self.config.max_turns,
            "game started"
        );

        let mut out = vec![(Recipient::All, ServerEvent::UpdateConfig(self.config.clone()))];
        self.phase = GamePhase::Playing;
        out.extend(self.advance_turn());
        if self.phase == GamePhase::Playing {
            self.timers.rearm_game(self.config.game_duration());
        }
        out
    }

    /// Moves a classic game to its next turn, or ends it past `max_turns`.
    ///
    /// Resets every score (and, on turn 1, every `turns_completed`), then
    /// deals a round per active player in personal mode, or one shared
    /// round plus the repeating turn timer in room mode.
    pub fn advance_turn(&mut self) -> Outbound {
        if self.phase != GamePhase::Playing {
            return Vec::new();
        }
        self.current_turn += 1;
        if self.current_turn > self.config.max_turns {
            return self.end_game();
        }

        for player in self.players.values_mut() {
            player.score = 0;
            if self.current_turn == 1 {
                player.turns_completed = 0;
            }
        }
        let mut out = vec![(Recipient::All, ServerEvent::UpdatePlayers(self.player_views()))];

        match self.config.turn_mode {
            TurnMode::Personal => {
                let active: Vec<PlayerId> = self
                    .players
                    .values()
                    .filter(|p| p.is_active)
                    .map(|p| p.id)
                    .collect();
                for player_id in active {
                    out.extend(self.deal_personal(player_id));
                }
            }
            TurnMode::Room => {
                out.extend(self.deal_shared());
                self.timers.rearm_turn(self.config.turn_duration());
            }
        }
        out
    }

    fn deal_shared(&mut self) -> Outbound {
        self.round = round::generate_round(&self.config, catalog(), &mut self.rng);
        for player in self.players.values_mut() {
            player.picked.clear();
        }
        debug!(room_id = %self.id, turn = self.current_turn, "shared round dealt");
        vec![(
            Recipient::All,
            ServerEvent::NewTurn(self.round.turn_data(self.current_turn, &self.config)),
        )]
    }

    fn deal_personal(&mut self, player_id: PlayerId) -> Outbound {
        let Some(player) = self.players.get_mut(&player_id) else {
            return Vec::new();
        };
        let round = round::generate_round(&self.config, catalog(), &mut self.rng);
        player.picked.clear();
        let turn = player.turns_completed + 1;
        let data = round.turn_data(turn, &self.config);
        self.personal.insert(player_id, round);
        debug!(room_id = %self.id, %player_id, turn, "personal round dealt");
        vec![(Recipient::Player(player_id), ServerEvent::PersonalNewTurn(data))]
    }

    fn end_game(&mut self) -> Outbound {
        self.timers.cancel_all();
        self.phase = GamePhase::Ended;
        info!(room_id = %self.id, turn = self.current_turn, "game over");
        vec![(Recipient::All, ServerEvent::GameOver(self.player_views()))]
    }

    /// Personal mode: ends the game once every active player is done.
    fn end_if_all_finished(&mut self) -> Outbound {
        if self.phase != GamePhase::Playing || self.config.turn_mode != TurnMode::Personal {
            return Vec::new();
        }
        let max_turns = self.config.max_turns;
        let all_done = {
            let mut active = self.players.values().filter(|p| p.is_active).peekable();
            active.peek().is_some() && active.all(|p| p.turns_completed >= max_turns)
        };
        if all_done { self.end_game() } else { Vec::new() }
    }

    /// Personal mode: counts a finished turn, then deals the next round or
    /// reports the player's game as finished.
    fn complete_personal_turn(&mut self, player_id: PlayerId) -> Outbound {
        let Some(player) = self.players.get_mut(&player_id) else {
            return Vec::new();
        };
        player.turns_completed += 1;
        let (score, turns_completed) = (player.score, player.turns_completed);

        if turns_completed < self.config.max_turns {
            return self.deal_personal(player_id);
        }

        self.personal.remove(&player_id);
        info!(room_id = %self.id, %player_id, score, "personal game finished");
        let mut out = vec![(
            Recipient::Player(player_id),
            ServerEvent::PersonalGameFinished {
                score,
                turns_completed,
            },
        )];
        out.extend(self.end_if_all_finished());
        out
    }

    /// Credits the whole turn: `+|targets|`. In personal mode the player
    /// also moves to their next round.
    pub fn submit_win(&mut self, player_id: PlayerId) -> Outbound {
        if self.phase != GamePhase::Playing || !self.is_member(player_id, "submit_win") {
            return Vec::new();
        }
        let gained = match self.config.turn_mode {
            TurnMode::Room => score::submit_win(&self.round.target),
            TurnMode::Personal => match self.personal.get(&player_id) {
                Some(round) => score::submit_win(&round.target),
                None => return Vec::new(),
            },
        };
        if let Some(player) = self.players.get_mut(&player_id) {
            player.score += gained;
        }

        let mut out = vec![(Recipient::All, ServerEvent::UpdateScores(self.scores()))];
        if self.config.turn_mode == TurnMode::Personal {
            out.extend(self.complete_personal_turn(player_id));
        }
        out
    }

    /// Personal mode only: the player's turn ran out without a win.
    pub fn request_turn_timeout(&mut self, player_id: PlayerId) -> Outbound {
        if self.phase != GamePhase::Playing
            || self.config.turn_mode != TurnMode::Personal
            || !self.personal.contains_key(&player_id)
        {
            return Vec::new();
        }
        self.complete_personal_turn(player_id)
    }

    /// Applies the wrong-pick penalty.
    pub fn submit_wrong(&mut self, player_id: PlayerId) -> Outbound {
        if self.phase != GamePhase::Playing {
            return Vec::new();
        }
        let Some(player) = self.players.get_mut(&player_id) else {
            return Vec::new();
        };
        player.score = score::after_wrong_pick(player.score, &self.config);
        let score = player.score;
        vec![
            (
                Recipient::Player(player_id),
                ServerEvent::WrongAnswer {
                    instance_id: None,
                    score,
                },
            ),
            (Recipient::All, ServerEvent::UpdateScores(self.scores())),
        ]
    }

    /// A tile pick: scored while `PLAYING`, a ballot entry while
    /// `SELECTING`.
    pub fn select_animal(&mut self, player_id: PlayerId, instance_id: InstanceId) -> Outbound {
        match self.phase {
            GamePhase::Playing => self.pick(player_id, instance_id),
            GamePhase::Selecting => self.add_selection(player_id, instance_id),
            _ => Vec::new(),
        }
    }

    /// Scores a pick against the player's current grid, once per tile.
    fn pick(&mut self, player_id: PlayerId, instance_id: InstanceId) -> Outbound {
        let round = match self.config.turn_mode {
            TurnMode::Room => &self.round,
            TurnMode::Personal => match self.personal.get(&player_id) {
                Some(round) => round,
                None => return Vec::new(),
            },
        };
        let Some(tile) = round.tile(&instance_id) else {
            debug!(room_id = %self.id, %player_id, %instance_id, "pick of unknown tile");
            return Vec::new();
        };
        let correct = round.is_target_species(tile.species_id());

        let Some(player) = self.players.get_mut(&player_id) else {
            return Vec::new();
        };
        if !player.picked.insert(instance_id.clone()) {
            return Vec::new();
        }
        player.score = if correct {
            player.score + score::CORRECT_PICK
        } else {
            score::after_wrong_pick(player.score, &self.config)
        };
        let score = player.score;

        let mut out = Vec::with_capacity(2);
        if !correct {
            out.push((
                Recipient::Player(player_id),
                ServerEvent::WrongAnswer {
                    instance_id: Some(instance_id),
                    score,
                },
            ));
        }
        out.push((Recipient::All, ServerEvent::UpdateScores(self.scores())));
        out
    }

    /// Ends the current game for everyone, whatever its phase.
    pub fn force_end_game(&mut self, player_id: PlayerId) -> Outbound {
        if !self.is_member(player_id, "force_end_game") {
            return Vec::new();
        }
        info!(room_id = %self.id, %player_id, "game force-ended");
        self.end_game()
    }

    // -----------------------------------------------------------------------
    // Suggestion mode
    // -----------------------------------------------------------------------

    /// Starts a cooperative selection game.
    pub fn start_game_suggest(
        &mut self,
        player_id: PlayerId,
        raw: Option<&RawConfig>,
    ) -> Outbound {
        if !self.adopt_game_config(player_id, raw) {
            return Vec::new();
        }
        for player in self.players.values_mut() {
            player.score = 0;
            player.turns_completed = 0;
        }
        self.current_turn = 1;
        info!(
            room_id = %self.id,
            %player_id,
            max_turns = self.config.max_turns,
            "suggestion game started"
        );

        let mut out = vec![
            (Recipient::All, ServerEvent::UpdateConfig(self.config.clone())),
            (Recipient::All, ServerEvent::UpdatePlayers(self.player_views())),
        ];
        out.extend(self.deal_grid());
        out
    }

    fn deal_grid(&mut self) -> Outbound {
        self.round = Round {
            animals: round::generate_grid(&self.config, catalog(), &mut self.rng),
            target: Vec::new(),
        };
        self.selections.clear();
        self.phase = GamePhase::Selecting;
        debug!(room_id = %self.id, turn = self.current_turn, "suggestion grid dealt");
        vec![(Recipient::All, self.suggest_data())]
    }

    fn suggest_data(&self) -> ServerEvent {
        ServerEvent::NewTurnSuggestData {
            animals: self.round.animals.clone(),
            turn_count: self.current_turn,
            max_turns: self.config.max_turns,
        }
    }

    fn selections_updated(&self, player_id: PlayerId) -> Outbound {
        vec![(
            Recipient::Player(player_id),
            ServerEvent::YourSelectionsUpdated {
                selections: self.selections(player_id).to_vec(),
            },
        )]
    }

    fn can_select(&self, player_id: PlayerId, instance_id: &InstanceId) -> bool {
        self.phase == GamePhase::Selecting
            && self.is_member(player_id, "selection")
            && self.round.tile(instance_id).is_some()
    }

    fn add_selection(&mut self, player_id: PlayerId, instance_id: InstanceId) -> Outbound {
        if !self.can_select(player_id, &instance_id) {
            return Vec::new();
        }
        let cap = self.config.grid_size;
        let ballot = self.selections.entry(player_id).or_default();
        if !ballot.contains(&instance_id) && ballot.len() < cap {
            ballot.push(instance_id);
        }
        self.selections_updated(player_id)
    }

    /// Adds the tile to the player's ballot, or removes it if present.
    pub fn toggle_selection(&mut self, player_id: PlayerId, instance_id: InstanceId) -> Outbound {
        if !self.can_select(player_id, &instance_id) {
            return Vec::new();
        }
        let cap = self.config.grid_size;
        let ballot = self.selections.entry(player_id).or_default();
        match ballot.iter().position(|id| *id == instance_id) {
            Some(pos) => {
                ballot.remove(pos);
            }
            None if ballot.len() < cap => ballot.push(instance_id),
            None => {}
        }
        self.selections_updated(player_id)
    }

    /// Advances the priority rotation and hands it to the caller.
    pub fn stt_rotate(&mut self, player_id: PlayerId) -> Outbound {
        if !self.is_member(player_id, "stt") {
            return Vec::new();
        }
        self.stt = (self.stt + 1) % (self.config.target_count + 1);
        self.stt_owner = Some(player_id);
        debug!(room_id = %self.id, %player_id, stt = self.stt, "priority rotation");
        Vec::new()
    }

    /// Draws the targets, scores every ballot and reveals the results.
    pub fn host_confirm_reveal(&mut self, player_id: PlayerId) -> Outbound {
        if self.phase != GamePhase::Selecting {
            return Vec::new();
        }
        let Some(requester) = self.players.get(&player_id) else {
            return Vec::new();
        };
        let is_boss = self.config.is_boss(&requester.username);
        let bias = reveal::bias(self.stt, self.config.target_count);

        let favoured: Vec<InstanceId> = match self.stt_owner {
            Some(owner) if !is_boss => self.selections(owner).to_vec(),
            _ => Vec::new(),
        };
        let balloted: Vec<InstanceId> = if is_boss {
            self.selections.values().flatten().cloned().collect()
        } else {
            Vec::new()
        };
        let priority = if is_boss {
            Priority::Exclude(&balloted)
        } else {
            Priority::Favour(&favoured)
        };
        let targets = reveal::draw_targets(
            &self.round.animals,
            self.config.target_count,
            bias,
            priority,
            &mut self.rng,
        );

        let mut ballots = Vec::new();
        for player in self.players.values_mut() {
            let Some(selection) = self.selections.get(&player.id) else {
                continue;
            };
            if selection.is_empty() {
                continue;
            }
            let picked = selection.iter().filter_map(|id| self.round.tile(id));
            player.score += score::reveal(picked, &targets);
            ballots.push(Ballot {
                player_id: player.id,
                username: player.username.clone(),
                selections: selection.clone(),
            });
        }

        self.round.target = targets.clone();
        self.phase = GamePhase::Revealed;
        info!(
            room_id = %self.id,
            %player_id,
            boss = is_boss,
            bias,
            turn = self.current_turn,
            "results revealed"
        );
        vec![(
            Recipient::All,
            ServerEvent::ResultsRevealed {
                targets,
                ballots,
                players: self.player_views(),
            },
        )]
    }

    /// Next suggestion turn, or the end of the game past `max_turns`.
    pub fn new_turn_suggest(&mut self, player_id: PlayerId) -> Outbound {
        if !matches!(self.phase, GamePhase::Selecting | GamePhase::Revealed)
            || !self.is_member(player_id, "new_turn_suggest")
        {
            return Vec::new();
        }
        self.current_turn += 1;
        if self.current_turn > self.config.max_turns {
            return self.end_game();
        }
        self.deal_grid()
    }
}
