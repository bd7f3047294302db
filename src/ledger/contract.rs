// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! BearBucks contract binding.

use alloy::sol;

// ERC-20 plus the campus card extensions. Only the functions the server
// calls are declared.
sol! {
    #[sol(rpc)]
    interface IBearBucks {
        event Transfer(address indexed from, address indexed to, uint256 value);

        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function mint(address to, uint256 amount) external;

        function setUserCredentials(address user, string email, string encryptedPassword) external;
        function userCredentials(address user) external view returns (string memory email, string memory encryptedPassword);

        function setUserAssets(address user, string studentId, bool ticketAccess, bool doorAccess, uint256 attendance) external;
        function getUserAssets(address user) external view returns (string memory studentId, bool ticketAccess, bool doorAccess, uint256 attendance);
        function incrementAttendance(address user) external;
    }
}
