//! In-memory burner router
//!
//! Receiver and delay changes are staged by the owner and only take effect
//! once the router delay has elapsed.

use std::collections::HashMap;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use vault_core_types::{Address, BurnerError, BurnerRouter, Timestamp};

/// Receiver for everything slashed on a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkReceiver {
    pub network: Address,
    pub receiver: Address,
}

/// Receiver for what is slashed from one operator on a network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorNetworkReceiver {
    pub network: Address,
    pub operator: Address,
    pub receiver: Address,
}

/// Burner router initialization parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnerRouterParams {
    pub owner: Address,
    pub collateral: Address,
    pub delay: u64,
    pub global_receiver: Address,
    #[serde(default)]
    pub network_receivers: Vec<NetworkReceiver>,
    #[serde(default)]
    pub operator_network_receivers: Vec<OperatorNetworkReceiver>,
}

/// A staged change and the time it may be accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Pending<T> {
    pub value: T,
    pub ready_at: Timestamp,
}

impl<T: Copy> Pending<T> {
    fn take_if_ready(slot: &mut Option<Pending<T>>, now: Timestamp) -> Result<T, BurnerError> {
        let pending = slot.ok_or(BurnerError::NoPendingChange)?;
        if now < pending.ready_at {
            return Err(BurnerError::NotReady {
                ready_at: pending.ready_at,
            });
        }
        *slot = None;
        Ok(pending.value)
    }
}

/// In-memory burner router
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct InMemoryBurnerRouter {
    owner: Address,
    collateral: Address,
    delay: u64,
    pending_delay: Option<Pending<u64>>,
    global_receiver: Address,
    pending_global_receiver: Option<Pending<Address>>,
    network_receivers: HashMap<Address, Address>,
    pending_network_receivers: HashMap<Address, Pending<Address>>,
    operator_network_receivers: HashMap<(Address, Address), Address>,
    pending_operator_network_receivers: HashMap<(Address, Address), Pending<Address>>,
}

impl InMemoryBurnerRouter {
    pub fn new(params: BurnerRouterParams) -> Result<Self, BurnerError> {
        if params.global_receiver.is_zero() {
            return Err(BurnerError::InvalidReceiver);
        }

        let mut network_receivers = HashMap::new();
        for entry in &params.network_receivers {
            if entry.receiver.is_zero() || network_receivers.insert(entry.network, entry.receiver).is_some() {
                return Err(BurnerError::InvalidReceiver);
            }
        }

        let mut operator_network_receivers = HashMap::new();
        for entry in &params.operator_network_receivers {
            let key = (entry.network, entry.operator);
            if entry.receiver.is_zero() || operator_network_receivers.insert(key, entry.receiver).is_some() {
                return Err(BurnerError::InvalidReceiver);
            }
        }

        log::info!(
            "Burner router for {} created with {}s delay, global receiver {}",
            params.collateral,
            params.delay,
            params.global_receiver
        );

        Ok(Self {
            owner: params.owner,
            collateral: params.collateral,
            delay: params.delay,
            pending_delay: None,
            global_receiver: params.global_receiver,
            pending_global_receiver: None,
            network_receivers,
            pending_network_receivers: HashMap::new(),
            operator_network_receivers,
            pending_operator_network_receivers: HashMap::new(),
        })
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn pending_delay(&self) -> Option<Pending<u64>> {
        self.pending_delay
    }

    pub fn pending_global_receiver(&self) -> Option<Pending<Address>> {
        self.pending_global_receiver
    }

    pub fn pending_network_receiver(&self, network: Address) -> Option<Pending<Address>> {
        self.pending_network_receivers.get(&network).copied()
    }

    pub fn pending_operator_network_receiver(&self, network: Address, operator: Address) -> Option<Pending<Address>> {
        self.pending_operator_network_receivers
            .get(&(network, operator))
            .copied()
    }

    fn only_owner(&self, caller: Address) -> Result<(), BurnerError> {
        if caller != self.owner {
            return Err(BurnerError::NotOwner { caller });
        }
        Ok(())
    }

    fn ready_at(&self, now: Timestamp) -> Result<Timestamp, BurnerError> {
        now.checked_add(self.delay).ok_or(BurnerError::Overflow)
    }

    //--------------------------------------------------------------------------
    // STAGED CHANGES
    //--------------------------------------------------------------------------

    /// Stage a new global receiver, accepted after the delay
    pub fn set_global_receiver(&mut self, caller: Address, receiver: Address, now: Timestamp) -> Result<(), BurnerError> {
        self.only_owner(caller)?;
        if receiver.is_zero() {
            return Err(BurnerError::InvalidReceiver);
        }
        if receiver == self.global_receiver && self.pending_global_receiver.is_none() {
            return Err(BurnerError::AlreadySet);
        }
        let ready_at = self.ready_at(now)?;
        self.pending_global_receiver = Some(Pending { value: receiver, ready_at });
        log::debug!("Global receiver {} pending until {}", receiver, ready_at);
        Ok(())
    }

    pub fn accept_global_receiver(&mut self, now: Timestamp) -> Result<Address, BurnerError> {
        let receiver = Pending::take_if_ready(&mut self.pending_global_receiver, now)?;
        self.global_receiver = receiver;
        log::debug!("Global receiver set to {}", receiver);
        Ok(receiver)
    }

    /// Stage a network receiver; a zero receiver removes the override
    pub fn set_network_receiver(
        &mut self,
        caller: Address,
        network: Address,
        receiver: Address,
        now: Timestamp,
    ) -> Result<(), BurnerError> {
        self.only_owner(caller)?;
        let current = self.network_receivers.get(&network).copied().unwrap_or(Address::ZERO);
        if receiver == current && !self.pending_network_receivers.contains_key(&network) {
            return Err(BurnerError::AlreadySet);
        }
        let ready_at = self.ready_at(now)?;
        self.pending_network_receivers
            .insert(network, Pending { value: receiver, ready_at });
        log::debug!("Network {} receiver {} pending until {}", network, receiver, ready_at);
        Ok(())
    }

    pub fn accept_network_receiver(&mut self, network: Address, now: Timestamp) -> Result<Address, BurnerError> {
        let mut slot = self.pending_network_receivers.get(&network).copied();
        let receiver = Pending::take_if_ready(&mut slot, now)?;
        self.pending_network_receivers.remove(&network);
        if receiver.is_zero() {
            self.network_receivers.remove(&network);
        } else {
            self.network_receivers.insert(network, receiver);
        }
        Ok(receiver)
    }

    /// Stage an operator-network receiver; a zero receiver removes the override
    pub fn set_operator_network_receiver(
        &mut self,
        caller: Address,
        network: Address,
        operator: Address,
        receiver: Address,
        now: Timestamp,
    ) -> Result<(), BurnerError> {
        self.only_owner(caller)?;
        let key = (network, operator);
        let current = self.operator_network_receivers.get(&key).copied().unwrap_or(Address::ZERO);
        if receiver == current && !self.pending_operator_network_receivers.contains_key(&key) {
            return Err(BurnerError::AlreadySet);
        }
        let ready_at = self.ready_at(now)?;
        self.pending_operator_network_receivers
            .insert(key, Pending { value: receiver, ready_at });
        log::debug!(
            "Operator {} on network {} receiver {} pending until {}",
            operator,
            network,
            receiver,
            ready_at
        );
        Ok(())
    }

    pub fn accept_operator_network_receiver(
        &mut self,
        network: Address,
        operator: Address,
        now: Timestamp,
    ) -> Result<Address, BurnerError> {
        let key = (network, operator);
        let mut slot = self.pending_operator_network_receivers.get(&key).copied();
        let receiver = Pending::take_if_ready(&mut slot, now)?;
        self.pending_operator_network_receivers.remove(&key);
        if receiver.is_zero() {
            self.operator_network_receivers.remove(&key);
        } else {
            self.operator_network_receivers.insert(key, receiver);
        }
        Ok(receiver)
    }

    /// Stage a new delay; the current delay applies to the change itself
    pub fn set_delay(&mut self, caller: Address, delay: u64, now: Timestamp) -> Result<(), BurnerError> {
        self.only_owner(caller)?;
        if delay == self.delay && self.pending_delay.is_none() {
            return Err(BurnerError::AlreadySet);
        }
        let ready_at = self.ready_at(now)?;
        self.pending_delay = Some(Pending { value: delay, ready_at });
        log::debug!("Delay {}s pending until {}", delay, ready_at);
        Ok(())
    }

    pub fn accept_delay(&mut self, now: Timestamp) -> Result<u64, BurnerError> {
        let delay = Pending::take_if_ready(&mut self.pending_delay, now)?;
        self.delay = delay;
        log::debug!("Delay set to {}s", delay);
        Ok(delay)
    }
}

impl BurnerRouter for InMemoryBurnerRouter {
    fn collateral(&self) -> Address {
        self.collateral
    }

    fn global_receiver(&self) -> Address {
        self.global_receiver
    }

    fn delay(&self) -> u64 {
        self.delay
    }

    fn network_receiver(&self, network: Address) -> Option<Address> {
        self.network_receivers.get(&network).copied()
    }

    fn operator_network_receiver(&self, network: Address, operator: Address) -> Option<Address> {
        self.operator_network_receivers.get(&(network, operator)).copied()
    }
}
