// ═══════════════════════════════════════════════════════════════════════
// Console Agent — a human player on a line-based terminal
//
// Reads answers from any BufRead and writes prompts to any Write, so a
// scripted session can stand in for stdin. Malformed input is never
// forwarded: the agent asks again until it gets a legal answer. When the
// input closes, the agent falls back to the passive choice.
// ═══════════════════════════════════════════════════════════════════════

use std::io::{BufRead, Write};

use warwick_agents::Agent;
use warwick_engine::engine::BuildOrder;
use warwick_engine::types::*;
use warwick_engine::visibility::PlayerView;

pub struct ConsoleAgent<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleAgent<R, W> {
    pub fn new(input: R, output: W) -> Self {
        ConsoleAgent { input, output }
    }

    fn say(&mut self, text: &str) {
        // a broken terminal leaves nothing to report to
        writeln!(self.output, "{}", text).ok();
    }

    /// One trimmed line; `None` once the input is closed.
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        write!(self.output, "{} ", prompt).ok();
        self.output.flush().ok();
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    /// A number below `count`. An empty answer is `None` when `optional`.
    fn ask_number(&mut self, prompt: &str, count: usize, optional: bool) -> Option<usize> {
        loop {
            let line = self.read_line(prompt)?;
            if line.is_empty() && optional {
                return None;
            }
            match line.parse::<usize>() {
                Ok(n) if n < count => return Some(n),
                _ => self.say(&format!("Please enter a number from 0 to {}.", count.saturating_sub(1))),
            }
        }
    }

    fn ask_yes_no(&mut self, prompt: &str) -> Option<bool> {
        loop {
            let line = self.read_line(&format!("{} [y/n]", prompt))?;
            match line.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Some(true),
                "n" | "no" => return Some(false),
                _ => self.say("Please answer y or n."),
            }
        }
    }

    /// Exactly `count` distinct picks from `slots`, space separated.
    fn ask_discards(&mut self, slots: &[(CardRef, CardId)], count: usize) -> Option<Vec<CardRef>> {
        for (i, (slot, card)) in slots.iter().enumerate() {
            self.say(&format!("  {}: {} [{}]", i, card, slot));
        }
        loop {
            let line = self.read_line(&format!("Choose {} card(s) to discard:", count))?;
            let picks: Result<Vec<usize>, _> = line.split_whitespace().map(str::parse::<usize>).collect();
            match picks {
                Ok(picks) if is_valid_pick(&picks, slots.len(), count) => {
                    return Some(picks.into_iter().map(|i| slots[i].0).collect());
                }
                _ => self.say(&format!("Please enter {} different numbers from the list.", count)),
            }
        }
    }

    fn show_table(&mut self, view: &PlayerView) {
        self.say(&format!("\n== {} | round {} | stock {} ==", view.viewer, view.round, view.stock_remaining));
        self.say(&format!("Opponent tableau:{}", view.opponent_tableau));
        self.say(&format!("Your tableau:{}", view.tableau));
        let stored: Vec<String> = view.tableau.usable_storage()
            .filter_map(|(_, c)| c.map(|c| c.to_string()))
            .collect();
        if !stored.is_empty() {
            self.say(&format!("Storage: {}", stored.join(", ")));
        }
        match view.discard_top {
            Some(top) => self.say(&format!("Discard pile: {} cards, top {}", view.discard_count, top)),
            None => self.say("Discard pile: empty"),
        }
        self.say(&format!("Hand: {}", view.hand));
    }

    fn list_hand(&mut self, view: &PlayerView) -> Vec<usize> {
        let positions: Vec<usize> = view.hand.iter().map(|(pos, _)| pos).collect();
        for (i, &pos) in positions.iter().enumerate() {
            if let Some(card) = view.hand.get(pos) {
                self.say(&format!("  {}: {}", i, card));
            }
        }
        positions
    }
}

fn is_valid_pick(picks: &[usize], available: usize, count: usize) -> bool {
    picks.len() == count
        && picks.iter().all(|&i| i < available)
        && picks.iter().enumerate().all(|(n, i)| !picks[..n].contains(i))
}

impl<R: BufRead + Send, W: Write + Send> Agent for ConsoleAgent<R, W> {
    fn name(&self) -> &str {
        "Human"
    }

    fn choose_build(&mut self, view: &PlayerView, candidates: &[BuildCandidate]) -> Option<BuildOrder> {
        self.show_table(view);
        let legal: Vec<&BuildCandidate> = candidates.iter().filter(|c| c.verdict.is_legal()).collect();
        for candidate in candidates.iter().filter(|c| !c.verdict.is_legal()) {
            self.say(&format!("  -: {} ({})", candidate.card, candidate.verdict));
        }
        for (i, candidate) in legal.iter().enumerate() {
            self.say(&format!("  {}: build {} ({})", i, candidate.card, candidate.verdict));
        }
        let pick = legal[self.ask_number("Choose a card to build, or press enter to stop:", legal.len(), true)?];

        let count = pick.verdict.discard_count();
        let mut discards = Vec::new();
        if count > 0 {
            let hand = view.hand.iter().map(|(pos, c)| (CardRef::Hand(pos), c));
            let storage = view.tableau.usable_storage()
                .filter_map(|(pos, c)| c.map(|c| (CardRef::Storage(pos), c)));
            let slots: Vec<(CardRef, CardId)> = hand.chain(storage).filter(|(s, _)| *s != pick.slot).collect();
            discards = self.ask_discards(&slots, count)?;
        }
        Some(BuildOrder { slot: pick.slot, discards })
    }

    fn choose_redraw(&mut self, view: &PlayerView) -> bool {
        self.show_table(view);
        self.ask_yes_no("You cannot build with a full hand. Dump it and redraw?").unwrap_or(true)
    }

    fn choose_storage_fill(&mut self, view: &PlayerView, slot: usize, options: &[StorageSource]) -> Option<StorageSource> {
        self.say(&format!("Fill storage space {}:", slot + 1));
        for (i, option) in options.iter().enumerate() {
            let text = match option {
                StorageSource::Stock => "top of the stock (face down)".to_string(),
                StorageSource::DiscardTop => match view.discard_top {
                    Some(top) => format!("top of the discard pile: {}", top),
                    None => "top of the discard pile".to_string(),
                },
                StorageSource::Hand(pos) => match view.hand.get(*pos) {
                    Some(card) => format!("from hand: {}", card),
                    None => "from hand".to_string(),
                },
            };
            self.say(&format!("  {}: {}", i, text));
        }
        let i = self.ask_number("Choose a source, or press enter to leave it empty:", options.len(), true)?;
        Some(options[i])
    }

    fn choose_attack(&mut self, view: &PlayerView, targets: &[Kind]) -> Option<Kind> {
        self.say("Your soldier may take:");
        for (i, &kind) in targets.iter().enumerate() {
            if let Some(card) = view.opponent_tableau.top(kind) {
                self.say(&format!("  {}: {}", i, card));
            }
        }
        let i = self.ask_number("Choose a building to take, or press enter to hold:", targets.len(), true)?;
        Some(targets[i])
    }

    fn choose_trash(&mut self, view: &PlayerView, remaining: u32) -> Option<usize> {
        self.say(&format!("You may trash {} more card(s):", remaining));
        let positions = self.list_hand(view);
        let i = self.ask_number("Choose a card to trash, or press enter to stop:", positions.len(), true)?;
        Some(positions[i])
    }

    fn choose_discard_draw(&mut self, _view: &PlayerView, top: CardId) -> bool {
        self.ask_yes_no(&format!("Draw {} from the discard pile?", top)).unwrap_or(false)
    }

    fn choose_discard(&mut self, view: &PlayerView, excess: usize) -> usize {
        self.say(&format!("Your hand is over the limit by {}:", excess));
        let positions = self.list_hand(view);
        let i = self.ask_number("Choose a card to discard:", positions.len(), false).unwrap_or(0);
        positions.get(i).copied().unwrap_or(0)
    }
}
