#![allow(dead_code)]

use fedimark_core::{
    Account, CategoryList, DirectoryClient, DirectoryError, DirectoryResult, FollowerPage,
    Identity, Notification, Page, StreamEvent,
};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Remote call recorded by `FakeDirectory`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ResolveSelf,
    ListFollowers { max_id: Option<String>, limit: u32 },
    ListCategoryLists,
    ListAccountCategoryLists { account_id: String },
    CreateCategoryList { title: String },
    AddMember { list_id: String, account_id: String },
    RemoveMember { list_id: String, account_id: String },
    FetchNotifications { limit: u32 },
    ClearNotifications,
    DismissThrough { watermark: String },
    OpenEventStream,
}

/// Failure switches for `FakeDirectory`.
#[derive(Debug, Default)]
pub struct Failures {
    pub resolve_self: bool,
    pub followers: bool,
    /// Every follower page answers with the same `next` cursor.
    pub repeat_cursor: bool,
    pub list_lookup: bool,
    pub membership_lookup: bool,
    pub create: bool,
    pub add: bool,
    pub remove_from: HashSet<String>,
    pub fetch: bool,
    pub clear: bool,
    pub stream: bool,
}

#[derive(Default)]
struct State {
    followers: Vec<Account>,
    lists: Vec<CategoryList>,
    members: BTreeMap<String, BTreeSet<String>>,
    next_list_id: u32,
    pending: Vec<Notification>,
    stream: Vec<StreamEvent>,
    failures: Failures,
    calls: Vec<Call>,
}

/// In-memory directory that records every call.
pub struct FakeDirectory {
    identity: Identity,
    state: Mutex<State>,
}

pub fn account(id: &str) -> Account {
    Account::new(id, format!("user{id}@example.social"))
}

pub fn remote_failure() -> DirectoryError {
    DirectoryError::Remote {
        status: 500,
        message: "injected".to_string(),
    }
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self {
            identity: Identity::new("0", "bot@example.social"),
            state: Mutex::new(State {
                next_list_id: 100,
                ..State::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn with_followers(self, followers: Vec<Account>) -> Self {
        self.state().followers = followers;
        self
    }

    /// Adds an existing list and returns its id.
    pub fn add_list(&self, title: &str) -> String {
        let mut state = self.state();
        state.next_list_id += 1;
        let id = state.next_list_id.to_string();
        state.lists.push(CategoryList::new(id.clone(), title));
        id
    }

    pub fn put_member(&self, list_id: &str, account_id: &str) {
        self.state()
            .members
            .entry(list_id.to_string())
            .or_default()
            .insert(account_id.to_string());
    }

    pub fn push_pending(&self, notifications: Vec<Notification>) {
        self.state().pending.extend(notifications);
    }

    pub fn pending_ids(&self) -> Vec<String> {
        self.state()
            .pending
            .iter()
            .map(|notification| notification.id.clone())
            .collect()
    }

    pub fn set_stream(&self, events: Vec<StreamEvent>) {
        self.state().stream = events;
    }

    pub fn fail(&self, configure: impl FnOnce(&mut Failures)) {
        configure(&mut self.state().failures);
    }

    pub fn reset_failures(&self) {
        self.state().failures = Failures::default();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn count(&self, matcher: impl Fn(&Call) -> bool) -> usize {
        self.state().calls.iter().filter(|call| matcher(call)).count()
    }

    pub fn lists(&self) -> Vec<CategoryList> {
        self.state().lists.clone()
    }

    /// Titles of the lists that contain `account_id`, sorted.
    pub fn titles_of(&self, account_id: &str) -> Vec<String> {
        let state = self.state();
        let mut titles: Vec<String> = state
            .lists
            .iter()
            .filter(|list| {
                state
                    .members
                    .get(&list.id)
                    .map(|members| members.contains(account_id))
                    .unwrap_or(false)
            })
            .map(|list| list.title.clone())
            .collect();
        titles.sort();
        titles
    }

    fn record(&self, call: Call) -> MutexGuard<'_, State> {
        let mut state = self.state();
        state.calls.push(call);
        state
    }
}

impl DirectoryClient for FakeDirectory {
    fn resolve_self(&self) -> DirectoryResult<Identity> {
        let state = self.record(Call::ResolveSelf);
        if state.failures.resolve_self {
            return Err(DirectoryError::Unauthorized);
        }
        Ok(self.identity.clone())
    }

    fn list_followers(&self, identity_id: &str, page: &Page) -> DirectoryResult<FollowerPage> {
        assert_eq!(identity_id, self.identity.id);
        let state = self.record(Call::ListFollowers {
            max_id: page.max_id.clone(),
            limit: page.limit,
        });
        if state.failures.followers {
            return Err(remote_failure());
        }

        let start = page
            .max_id
            .as_deref()
            .and_then(|cursor| cursor.parse::<usize>().ok())
            .unwrap_or(0);
        let end = (start + page.limit as usize).min(state.followers.len());
        let accounts = state.followers[start.min(end)..end].to_vec();
        let next = if state.failures.repeat_cursor {
            Some("same".to_string())
        } else {
            (end < state.followers.len()).then(|| end.to_string())
        };
        Ok(FollowerPage { accounts, next })
    }

    fn list_category_lists(&self, identity_id: &str) -> DirectoryResult<Vec<CategoryList>> {
        assert_eq!(identity_id, self.identity.id);
        let state = self.record(Call::ListCategoryLists);
        if state.failures.list_lookup {
            return Err(remote_failure());
        }
        Ok(state.lists.clone())
    }

    fn list_account_category_lists(
        &self,
        identity_id: &str,
        account_id: &str,
    ) -> DirectoryResult<Vec<CategoryList>> {
        assert_eq!(identity_id, self.identity.id);
        let state = self.record(Call::ListAccountCategoryLists {
            account_id: account_id.to_string(),
        });
        if state.failures.membership_lookup {
            return Err(DirectoryError::Transport("connection reset".to_string()));
        }
        Ok(state
            .lists
            .iter()
            .filter(|list| {
                state
                    .members
                    .get(&list.id)
                    .map(|members| members.contains(account_id))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    fn create_category_list(
        &self,
        identity_id: &str,
        title: &str,
    ) -> DirectoryResult<CategoryList> {
        assert_eq!(identity_id, self.identity.id);
        let mut state = self.record(Call::CreateCategoryList {
            title: title.to_string(),
        });
        if state.failures.create {
            return Err(remote_failure());
        }
        state.next_list_id += 1;
        let list = CategoryList::new(state.next_list_id.to_string(), title);
        state.lists.push(list.clone());
        Ok(list)
    }

    fn add_member(&self, list_id: &str, account_id: &str) -> DirectoryResult<()> {
        let mut state = self.record(Call::AddMember {
            list_id: list_id.to_string(),
            account_id: account_id.to_string(),
        });
        if state.failures.add {
            return Err(DirectoryError::RateLimited);
        }
        state
            .members
            .entry(list_id.to_string())
            .or_default()
            .insert(account_id.to_string());
        Ok(())
    }

    fn remove_member(&self, list_id: &str, account_id: &str) -> DirectoryResult<()> {
        let mut state = self.record(Call::RemoveMember {
            list_id: list_id.to_string(),
            account_id: account_id.to_string(),
        });
        if state.failures.remove_from.contains(list_id) {
            return Err(remote_failure());
        }
        if let Some(members) = state.members.get_mut(list_id) {
            members.remove(account_id);
        }
        Ok(())
    }

    fn fetch_notifications(&self, page: &Page) -> DirectoryResult<Vec<Notification>> {
        let state = self.record(Call::FetchNotifications { limit: page.limit });
        if state.failures.fetch {
            return Err(DirectoryError::Unauthorized);
        }
        Ok(state
            .pending
            .iter()
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    fn clear_notifications(&self) -> DirectoryResult<()> {
        let mut state = self.record(Call::ClearNotifications);
        if state.failures.clear {
            return Err(remote_failure());
        }
        state.pending.clear();
        Ok(())
    }

    fn dismiss_notifications_through(&self, watermark: &str) -> DirectoryResult<()> {
        let mut state = self.record(Call::DismissThrough {
            watermark: watermark.to_string(),
        });
        if state.failures.clear {
            return Err(remote_failure());
        }
        let position = state
            .pending
            .iter()
            .position(|notification| notification.id == watermark);
        if let Some(position) = position {
            state.pending.drain(..=position);
        }
        Ok(())
    }

    fn open_event_stream(&self) -> DirectoryResult<crossbeam_channel::Receiver<StreamEvent>> {
        let mut state = self.record(Call::OpenEventStream);
        if state.failures.stream {
            return Err(DirectoryError::Transport("handshake failed".to_string()));
        }
        let (sender, receiver) = crossbeam_channel::unbounded();
        for event in state.stream.drain(..) {
            sender.send(event).unwrap();
        }
        Ok(receiver)
    }
}
