//! 井字棋
//!
//! 3×3 落子游戏，实现 [`Searchable`] 供搜索引擎使用。
//! 先手方执 X，后手方执 O；走子方由棋盘上的棋子数决定，因此哈希键不需要单独记录走子方。

use std::fmt;

use protocol::{
    Board, HashKey, Location, Move, MoveError, MoveList, Perspective, Player, Result, Searchable,
    UndoStack, Weights, ZobristHash, WINNING_VALUE,
};
use tracing::debug;

/// 棋盘边长
pub const SIZE: u8 = 3;

/// 一子、两子连线的默认分值
const DEFAULT_LINE_WEIGHTS: [f64; 2] = [1.0, 10.0];

/// 全部 8 条连线
const LINES: [[(u8, u8); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// 井字棋局面
#[derive(Debug, Clone)]
pub struct TicTacToe {
    board: Board<Player>,
    hash: ZobristHash,
    history: MoveList,
    /// 玩家走子的悔棋记录（搜索内部走子不入栈）
    undo: UndoStack<Move>,
    winner: Option<Player>,
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl TicTacToe {
    /// 创建空棋盘
    pub fn new() -> Self {
        let board = Board::empty(SIZE, SIZE);
        Self {
            hash: ZobristHash::for_board(&board, 2, |p: Player| p.index()),
            board,
            history: MoveList::new(),
            undo: UndoStack::new(),
            winner: None,
        }
    }

    /// 按顺序落子构造局面（先手方先走）
    pub fn from_moves(moves: &[(u8, u8)]) -> Result<Self> {
        let mut game = Self::new();
        for &(row, col) in moves {
            game.play(Location::new(row, col))?;
        }
        Ok(game)
    }

    /// 默认评估系数
    pub fn default_weights() -> Weights {
        Weights::new(DEFAULT_LINE_WEIGHTS.to_vec())
    }

    pub fn board(&self) -> &Board<Player> {
        &self.board
    }

    /// 已记录的胜者
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// 下一步走子方
    pub fn next_player(&self) -> Player {
        let (ones, twos) = self.board.occupied().fold((0, 0), |(a, b), (_, p)| match p {
            Player::One => (a + 1, b),
            Player::Two => (a, b + 1),
        });
        if ones == twos {
            Player::One
        } else {
            Player::Two
        }
    }

    /// 玩家落子
    pub fn play(&mut self, loc: Location) -> Result<Move> {
        if self.winner.is_some() || self.board.is_full() {
            return Err(MoveError::GameOver);
        }
        self.board.check(loc)?;
        if self.board.get(loc).is_some() {
            return Err(MoveError::Occupied {
                row: loc.row,
                col: loc.col,
            });
        }

        let player = self.next_player();
        let mv = Move::new(loc, value_after(&self.board, loc, player, &Weights::default()), player);
        self.make_internal_move(&mv);
        self.undo.push(mv.clone());
        self.winner = self.line_winner();
        debug!("{:?} 落子 {}", player, loc);
        Ok(mv)
    }

    /// 指定走子方落子（走子方不符时拒绝）
    pub fn play_as(&mut self, player: Player, loc: Location) -> Result<Move> {
        if player != self.next_player() {
            return Err(MoveError::NotYourTurn);
        }
        self.play(loc)
    }

    /// 悔棋
    pub fn undo(&mut self) -> Result<Move> {
        let mv = self.undo.pop()?;
        self.undo_internal_move(&mv);
        self.winner = self.line_winner();
        Ok(mv)
    }

    fn line_winner(&self) -> Option<Player> {
        line_winner(&self.board)
    }

    /// 能连成三子的空位（任意一方）
    fn threat_cells(&self) -> Vec<Location> {
        line_counts(&self.board)
            .filter_map(|(ones, twos, empty)| match (ones, twos) {
                (2, 0) | (0, 2) => empty,
                _ => None,
            })
            .collect()
    }

    fn moves_for<I>(&self, cells: I, weights: &Weights, perspective: Perspective) -> MoveList
    where
        I: IntoIterator<Item = Location>,
    {
        if self.line_winner().is_some() {
            return MoveList::new();
        }
        let player = self.next_player();
        let mut moves: MoveList = cells
            .into_iter()
            .map(|loc| Move::new(loc, value_after(&self.board, loc, player, weights), player))
            .collect();
        moves.sort_best_first(player);
        for i in 0..moves.len() {
            if let Some(mv) = moves.get_mut(i) {
                mv.value = perspective.from_absolute(mv.value, player);
                mv.inherited_value = mv.value;
            }
        }
        moves
    }
}

fn line_winner(board: &Board<Player>) -> Option<Player> {
    LINES.iter().find_map(|line| {
        let first = board.get(Location::new(line[0].0, line[0].1))?;
        line.iter()
            .all(|&(r, c)| board.get(Location::new(r, c)) == Some(first))
            .then_some(first)
    })
}

/// 每条连线上 (先手子数, 后手子数, 空位)
fn line_counts(board: &Board<Player>) -> impl Iterator<Item = (usize, usize, Option<Location>)> + '_ {
    LINES.iter().map(move |line| {
        let mut ones = 0;
        let mut twos = 0;
        let mut empty = None;
        for &(r, c) in line {
            let loc = Location::new(r, c);
            match board.get(loc) {
                Some(Player::One) => ones += 1,
                Some(Player::Two) => twos += 1,
                None => empty = Some(loc),
            }
        }
        (ones, twos, empty)
    })
}

/// 先手方视角的局面评估
///
/// 只有一方棋子的连线按子数计分（系数 0 对应一子，系数 1 对应两子），三连直接取胜负值
fn evaluate(board: &Board<Player>, weights: &Weights) -> i32 {
    if let Some(winner) = line_winner(board) {
        return winner.sign() * WINNING_VALUE;
    }
    let weight = |i: usize| {
        if weights.len() > i {
            weights.get(i)
        } else {
            DEFAULT_LINE_WEIGHTS[i]
        }
    };
    let line_score = |count: usize| match count {
        1 => weight(0),
        2 => weight(1),
        _ => 0.0,
    };

    let total: f64 = line_counts(board)
        .map(|(ones, twos, _)| match (ones, twos) {
            (n, 0) => line_score(n),
            (0, n) => -line_score(n),
            _ => 0.0,
        })
        .sum();
    total.round() as i32
}

/// 假设在 `loc` 落子后的评估值
fn value_after(board: &Board<Player>, loc: Location, player: Player, weights: &Weights) -> i32 {
    let mut next = board.clone();
    next.set(loc, Some(player));
    evaluate(&next, weights)
}

impl Searchable for TicTacToe {
    type Payload = ();

    fn generate_moves(
        &self,
        _last_move: Option<&Move>,
        weights: &Weights,
        perspective: Perspective,
    ) -> MoveList {
        let vacant: Vec<Location> = self.board.vacant().collect();
        self.moves_for(vacant, weights, perspective)
    }

    fn generate_urgent_moves(
        &self,
        _last_move: Option<&Move>,
        weights: &Weights,
        perspective: Perspective,
    ) -> MoveList {
        let threats = self.threat_cells();
        let cells: Vec<Location> = self
            .board
            .vacant()
            .filter(|loc| threats.contains(loc))
            .collect();
        let mut moves = self.moves_for(cells, weights, perspective);
        for i in 0..moves.len() {
            if let Some(mv) = moves.get_mut(i) {
                mv.urgent = true;
            }
        }
        moves
    }

    fn in_jeopardy(&self, _last_move: Option<&Move>, _weights: &Weights, _perspective: Perspective) -> bool {
        self.line_winner().is_none() && !self.threat_cells().is_empty()
    }

    fn worth(&self, _last_move: Option<&Move>, weights: &Weights, perspective: Perspective) -> i32 {
        perspective.from_absolute(evaluate(&self.board, weights), self.next_player())
    }

    fn make_internal_move(&mut self, mv: &Move) {
        self.board.set(mv.to, Some(mv.player));
        self.hash.toggle_location(mv.to, SIZE, mv.player.index());
        self.history.push(mv.clone());
    }

    fn undo_internal_move(&mut self, mv: &Move) {
        self.board.set(mv.to, None);
        self.hash.toggle_location(mv.to, SIZE, mv.player.index());
        self.history.pop();
    }

    fn done(&mut self, _last_move: Option<&Move>, record_win: bool) -> bool {
        let winner = self.line_winner();
        if record_win {
            self.winner = winner;
        }
        winner.is_some() || self.board.is_full()
    }

    fn hash_key(&self) -> HashKey {
        self.hash.key()
    }

    fn move_list(&self) -> &MoveList {
        &self.history
    }

    fn player_to_move(&self, _last_move: Option<&Move>) -> Player {
        self.next_player()
    }
}

impl fmt::Display for TicTacToe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..SIZE {
            for col in 0..SIZE {
                let c = match self.board.get(Location::new(row, col)) {
                    Some(Player::One) => 'X',
                    Some(Player::Two) => 'O',
                    None => '.',
                };
                write!(f, "{}", c)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
